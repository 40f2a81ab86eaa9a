use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the receiving endpoint
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub bind_addr: SocketAddr,
    /// Request path clients must ask for; anything else gets a 404
    pub resource: String,
    pub width: usize,
    pub height: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            resource: "/video".to_string(),
            width: 160,
            height: 128,
        }
    }
}

impl ReceiverConfig {
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }

    /// Only binary messages of exactly this size are displayed.
    pub fn frame_len(&self) -> usize {
        self.width * self.height * 2
    }

    pub(crate) fn checked_frame_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)?.checked_mul(2)
    }
}

#[derive(Default)]
pub struct ReceiverConfigBuilder {
    bind_addr: Option<SocketAddr>,
    resource: Option<String>,
    dimensions: Option<(usize, usize)>,
}

impl ReceiverConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn dimensions(mut self, width: usize, height: usize) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    pub fn build(self) -> ReceiverConfig {
        let default = ReceiverConfig::default();
        let (width, height) = self.dimensions.unwrap_or((default.width, default.height));
        ReceiverConfig {
            bind_addr: self.bind_addr.unwrap_or(default.bind_addr),
            resource: self.resource.unwrap_or(default.resource),
            width,
            height,
        }
    }
}
