//! Host capability detection.
//!
//! AES-GCM and PBKDF2 are compiled in, so the only primitive that can be
//! missing at runtime is the platform CSPRNG (e.g. a wasm host without
//! `crypto.getRandomValues`).

/// Reports whether the host can run the crypto layer.
///
/// Implementations must answer at call time; `CryptoUtils` asks before every
/// operation.
pub trait CapabilityProbe: Send + Sync {
    fn is_supported(&self) -> bool;
}

/// Probe that asks the platform CSPRNG for a byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformProbe;

impl CapabilityProbe for PlatformProbe {
    fn is_supported(&self) -> bool {
        is_supported()
    }
}

/// True iff the platform CSPRNG is reachable.
pub fn is_supported() -> bool {
    let mut probe = [0u8; 1];
    getrandom::getrandom(&mut probe).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_host_is_supported() {
        assert!(is_supported());
        assert!(PlatformProbe.is_supported());
    }
}
