use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::envelope::TransactionRecord;

/// Number of transactions signed on one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountPerMoment {
    /// Midnight (UTC) opening the day.
    pub moment: DateTime<Utc>,
    pub count: u64,
}

/// Midnight UTC of the day containing `time`.
pub fn day_of(time: DateTime<Utc>) -> DateTime<Utc> {
    time.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Count records per UTC day, oldest day first. Days without transactions are omitted.
pub fn aggregate<'a, I>(records: I) -> Vec<CountPerMoment>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut days: BTreeMap<DateTime<Utc>, u64> = BTreeMap::new();
    for record in records {
        *days.entry(day_of(record.signing_time)).or_default() += 1;
    }
    days.into_iter()
        .map(|(moment, count)| CountPerMoment { moment, count })
        .collect()
}
