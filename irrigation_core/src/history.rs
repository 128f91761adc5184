//! Newest-first log of completed and stopped runs.

use irrigation_traits::IrrigationRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    records: Vec<IrrigationRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records are taken as already ordered newest-first.
    pub fn from_records(records: Vec<IrrigationRecord>) -> Self {
        Self { records }
    }

    pub fn prepend(&mut self, record: IrrigationRecord) {
        self.records.insert(0, record);
    }

    /// Wholesale replace after an external refresh. Never merges.
    pub fn replace_all(&mut self, records: Vec<IrrigationRecord>) {
        self.records = records;
    }

    pub fn latest(&self) -> Option<&IrrigationRecord> {
        self.records.first()
    }

    pub fn records(&self) -> &[IrrigationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &IrrigationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_vec(&self) -> Vec<IrrigationRecord> {
        self.records.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(day: u32, actual: f64) -> IrrigationRecord {
        IrrigationRecord::new(
            NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            actual,
            actual,
        )
    }

    #[test]
    fn prepend_keeps_newest_first() {
        let mut log = HistoryLog::new();
        log.prepend(rec(1, 10.0));
        log.prepend(rec(2, 20.0));
        assert_eq!(log.len(), 2);
        assert_eq!(log.latest(), Some(&rec(2, 20.0)));
        assert_eq!(log.records()[1], rec(1, 10.0));
    }

    #[test]
    fn replace_all_discards_local_records() {
        let mut log = HistoryLog::from_records(vec![rec(5, 1.0)]);
        log.prepend(rec(6, 2.0));
        log.replace_all(vec![rec(4, 3.0)]);
        assert_eq!(log.to_vec(), vec![rec(4, 3.0)]);
    }
}
