/// Running counters for one stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    /// Ticks that started work (source was active)
    pub ticks: u64,
    /// Frames accepted by the transport
    pub sent: u64,
    /// Ticks skipped because no frame could be sampled
    pub skipped: u64,
    /// Frames the transport refused
    pub send_failures: u64,
    /// Running -> Idle transitions
    pub idle_transitions: u64,
}
