use std::sync::Mutex;

/// Partition assignment strategy for a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balancer {
    /// Route to the partition that has received the fewest bytes from this writer.
    LeastBytes,
    /// FNV-1a hash of the message key; keyless messages land on a random partition.
    Hash,
}

impl Balancer {
    /// librdkafka `partitioner` value, when the client library does the work itself.
    pub fn partitioner(&self) -> Option<&'static str> {
        match self {
            Balancer::LeastBytes => None,
            Balancer::Hash => Some("fnv1a_random"),
        }
    }
}

/// Byte counters backing [`Balancer::LeastBytes`].
#[derive(Debug, Default)]
pub struct LeastBytes {
    written: Mutex<Vec<u64>>,
}

impl LeastBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the partition with the fewest bytes written so far (lowest index
    /// on ties) and charges `len` bytes to it.
    pub fn pick(&self, partitions: usize, len: usize) -> i32 {
        let partitions = partitions.max(1);
        let mut written = self.written.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if written.len() != partitions {
            written.resize(partitions, 0);
        }
        let index = written
            .iter()
            .enumerate()
            .min_by_key(|(_, bytes)| **bytes)
            .map(|(index, _)| index)
            .unwrap_or(0);
        written[index] += len as u64;
        index as i32
    }

    pub fn snapshot(&self) -> Vec<u64> {
        self.written.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}
