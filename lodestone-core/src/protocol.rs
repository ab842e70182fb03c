//! Eth wire protocol handler selection.
//!
//! The node builds one [`HandlerRegistry`] at startup, registers a factory
//! per supported protocol version and passes the registry by reference to
//! whatever negotiates peer sessions. There is no ambient lookup.

use std::collections::BTreeMap;
use std::fmt;

use crate::{LodestoneResult, ProtocolError};

/// Known Eth protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EthVersion {
    V62,
    V63,
}

impl EthVersion {
    pub const ALL: [EthVersion; 2] = [EthVersion::V62, EthVersion::V63];

    /// Version number as advertised on the wire.
    pub fn code(self) -> u8 {
        match self {
            EthVersion::V62 => 62,
            EthVersion::V63 => 63,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            62 => Some(EthVersion::V62),
            63 => Some(EthVersion::V63),
            _ => None,
        }
    }
}

impl fmt::Display for EthVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eth/{}", self.code())
    }
}

/// A protocol handler bound to one Eth version.
pub trait EthHandler: Send + Sync {
    fn version(&self) -> EthVersion;
}

type HandlerFactory = Box<dyn Fn() -> Box<dyn EthHandler> + Send + Sync>;

/// Registry mapping protocol version numbers to handler factories.
#[derive(Default)]
pub struct HandlerRegistry {
    factories: BTreeMap<u8, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for `version`, replacing any previous one.
    pub fn register<F, H>(&mut self, version: EthVersion, factory: F) -> &mut Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: EthHandler + 'static,
    {
        self.factories
            .insert(version.code(), Box::new(move || Box::new(factory())));
        self
    }

    /// Build a fresh handler for the requested version number.
    ///
    /// Fails with [`ProtocolError::UnsupportedVersion`] when nothing is
    /// registered for `version`.
    pub fn create(&self, version: u8) -> LodestoneResult<Box<dyn EthHandler>> {
        let factory = self
            .factories
            .get(&version)
            .ok_or(ProtocolError::UnsupportedVersion { version })?;
        Ok(factory())
    }

    pub fn is_supported(&self, version: u8) -> bool {
        self.factories.contains_key(&version)
    }

    /// Registered versions, lowest first.
    pub fn versions(&self) -> Vec<EthVersion> {
        self.factories
            .keys()
            .filter_map(|code| EthVersion::from_code(*code))
            .collect()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("versions", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
