use std::{num::NonZeroUsize, ops::Deref};

use crate::{BatchErr, StreamRecord};

/// Default number of records in one publish request.
pub const MAX_RECORDS_PER_BATCH: usize = 10;

/// The most records the stream service accepts in one request.
pub const MAX_PUT_RECORDS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The maximum number of records in a [`Batch`]. Never zero, never above [`MAX_PUT_RECORDS`].
pub struct BatchSize(NonZeroUsize);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// An ordered group of records submitted together in one publish request.
pub struct Batch {
    records: Vec<StreamRecord>,
}

impl BatchSize {
    pub fn new(size: usize) -> Result<Self, BatchErr> {
        if size > MAX_PUT_RECORDS {
            return Err(BatchErr::TooLarge(size));
        }
        NonZeroUsize::new(size).map(Self).ok_or(BatchErr::ZeroSize)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::new(MAX_RECORDS_PER_BATCH).expect("Default batch size is valid")
    }
}

impl std::fmt::Display for BatchSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BatchSize {
    type Err = BatchErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size: usize = s
            .trim()
            .parse()
            .map_err(|_| BatchErr::Invalid(s.to_owned()))?;
        Self::new(size)
    }
}

impl Batch {
    pub fn new(records: Vec<StreamRecord>) -> Result<Self, BatchErr> {
        if records.len() > MAX_PUT_RECORDS {
            return Err(BatchErr::TooLarge(records.len()));
        }
        Ok(Self { records })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StreamRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StreamRecord> {
        self.records
    }
}

impl Deref for Batch {
    type Target = [StreamRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl IntoIterator for Batch {
    type Item = StreamRecord;
    type IntoIter = std::vec::IntoIter<StreamRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Slice `records` into contiguous batches of `size`, preserving order.
/// Only the last batch may be smaller; an empty input yields no batches.
pub fn partition(records: Vec<StreamRecord>, size: BatchSize) -> Vec<Batch> {
    let size = size.get();
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut records = records.into_iter().peekable();
    while records.peek().is_some() {
        batches.push(Batch {
            records: records.by_ref().take(size).collect(),
        });
    }
    batches
}

/// The batch of at most `size` records starting at `offset`. Empty if `offset` is past the end.
pub fn slice_at(records: &[StreamRecord], offset: usize, size: BatchSize) -> Batch {
    let start = offset.min(records.len());
    let end = offset.saturating_add(size.get()).min(records.len());
    Batch {
        records: records[start..end].to_vec(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::PartitionKey;

    fn records(n: usize) -> Vec<StreamRecord> {
        (0..n)
            .map(|i| {
                StreamRecord::new(
                    i.to_string().into_bytes(),
                    PartitionKey::new(format!("T{i}")).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_partition() {
        let size = BatchSize::new(10).unwrap();
        let input = records(25);
        let batches = partition(input.clone(), size);
        assert_eq!(
            batches.iter().map(|b| b.len()).collect::<Vec<_>>(),
            [10, 10, 5]
        );
        let joined: Vec<StreamRecord> = batches.into_iter().flatten().collect();
        assert_eq!(joined, input);

        for n in 1..=31 {
            for s in [1, 3, 10, 30] {
                let batches = partition(records(n), BatchSize::new(s).unwrap());
                let (last, full) = batches.split_last().unwrap();
                assert!(full.iter().all(|b| b.len() == s));
                assert!(!last.is_empty() && last.len() <= s);
                assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), n);
            }
        }

        assert!(partition(Vec::new(), size).is_empty());
    }

    #[test]
    fn test_slice_at() {
        let size = BatchSize::new(10).unwrap();
        let input = records(15);
        assert_eq!(slice_at(&input, 0, size).records(), &input[..10]);
        assert_eq!(slice_at(&input, 10, size).records(), &input[10..]);
        assert!(slice_at(&input, 20, size).is_empty());
        assert!(slice_at(&input, usize::MAX, size).is_empty());
    }

    #[test]
    fn test_batch_size() {
        assert_eq!(BatchSize::default().get(), MAX_RECORDS_PER_BATCH);
        assert_eq!(BatchSize::new(0), Err(BatchErr::ZeroSize));
        assert_eq!(BatchSize::new(501), Err(BatchErr::TooLarge(501)));
        assert_eq!("25".parse::<BatchSize>().unwrap().get(), 25);
        assert_eq!(
            "ten".parse::<BatchSize>(),
            Err(BatchErr::Invalid("ten".to_owned()))
        );
        assert_eq!("-3".parse::<BatchSize>(), Err(BatchErr::Invalid("-3".to_owned())));
        assert_eq!("0".parse::<BatchSize>(), Err(BatchErr::ZeroSize));
    }
}
