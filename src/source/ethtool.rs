//! Counter source backed by the Linux `SIOCETHTOOL` ioctl.
//!
//! Uses the legacy ioctl interface:
//! - `ETHTOOL_GDRVINFO` for the driver name
//! - `ETHTOOL_GSSET_INFO` for the number of statistics
//! - `ETHTOOL_GSTRINGS` for the statistic names
//! - `ETHTOOL_GSTATS` for the values
//!
//! Variable-length replies are read into `u32` word buffers and decoded with
//! native-endian byte conversions, so no unaligned reads are needed.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use tracing::debug;

use crate::error::SourceError;

use super::CounterSource;

const SIOCETHTOOL: libc::c_ulong = 0x8946;
const ETHTOOL_GDRVINFO: u32 = 0x0000_0003;
const ETHTOOL_GSTRINGS: u32 = 0x0000_001b;
const ETHTOOL_GSTATS: u32 = 0x0000_001d;
const ETHTOOL_GSSET_INFO: u32 = 0x0000_0037;
const ETH_SS_STATS: u32 = 1;
const ETH_GSTRING_LEN: usize = 32;
const IFNAMSIZ: usize = 16;

/// `struct ifreq` with the `ifr_data` union member.
#[repr(C)]
struct IfReq {
    name: [libc::c_char; IFNAMSIZ],
    data: *mut libc::c_void,
    _pad: [u8; 16],
}

/// `struct ethtool_drvinfo`.
#[allow(dead_code)]
#[repr(C)]
#[derive(Default)]
struct DrvInfo {
    cmd: u32,
    driver: [u8; 32],
    version: [u8; 32],
    fw_version: [u8; 32],
    bus_info: [u8; 32],
    erom_version: [u8; 32],
    reserved2: [u8; 12],
    n_priv_flags: u32,
    n_stats: u32,
    testinfo_len: u32,
    eedump_len: u32,
    regdump_len: u32,
}

/// Ethtool statistics for one network interface.
pub struct EthtoolSource {
    fd: OwnedFd,
    interface: String,
    driver: String,
    version: String,
    n_stats: Option<u32>,
}

impl EthtoolSource {
    /// Opens a control socket and reads the interface's driver info.
    pub fn open(interface: &str) -> Result<Self, SourceError> {
        if interface.len() >= IFNAMSIZ || interface.is_empty() {
            return Err(SourceError::InvalidName(interface.to_string()));
        }

        // SAFETY: plain socket(2) call; the result is checked before use.
        let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
        if raw < 0 {
            return Err(SourceError::Io {
                op: "socket",
                interface: interface.to_string(),
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let mut source = Self {
            fd,
            interface: interface.to_string(),
            driver: String::new(),
            version: String::new(),
            n_stats: None,
        };

        let mut info = DrvInfo {
            cmd: ETHTOOL_GDRVINFO,
            ..DrvInfo::default()
        };
        source.ioctl("ETHTOOL_GDRVINFO", (&mut info as *mut DrvInfo).cast())?;
        source.driver = c_string(&info.driver);
        source.version = c_string(&info.version);

        debug!(
            "{}: driver={} version={} n_stats={}",
            source.interface, source.driver, source.version, info.n_stats
        );
        Ok(source)
    }

    /// Driver version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn ioctl(&self, op: &'static str, data: *mut libc::c_void) -> Result<(), SourceError> {
        let mut ifr = IfReq {
            name: [0; IFNAMSIZ],
            data,
            _pad: [0; 16],
        };
        for (dst, src) in ifr.name.iter_mut().zip(self.interface.bytes()) {
            *dst = src as libc::c_char;
        }

        // SAFETY: `ifr` is a valid ifreq whose data pointer refers to a
        // buffer sized for the requested ethtool command.
        let ret = unsafe {
            libc::ioctl(
                self.fd.as_raw_fd(),
                SIOCETHTOOL as _,
                &mut ifr as *mut IfReq,
            )
        };
        if ret < 0 {
            return Err(SourceError::Io {
                op,
                interface: self.interface.clone(),
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }

    /// Number of statistics, memoised after the first query.
    fn stats_count(&mut self) -> Result<u32, SourceError> {
        if let Some(n) = self.n_stats {
            return Ok(n);
        }

        // cmd, reserved, sset_mask (u64), data[0]
        let mask = (1u64 << ETH_SS_STATS).to_ne_bytes();
        let mut buf = [
            ETHTOOL_GSSET_INFO,
            0,
            u32::from_ne_bytes([mask[0], mask[1], mask[2], mask[3]]),
            u32::from_ne_bytes([mask[4], mask[5], mask[6], mask[7]]),
            0,
        ];
        self.ioctl("ETHTOOL_GSSET_INFO", buf.as_mut_ptr().cast())?;

        let mut returned = [0u8; 8];
        returned[..4].copy_from_slice(&buf[2].to_ne_bytes());
        returned[4..].copy_from_slice(&buf[3].to_ne_bytes());
        let n = if u64::from_ne_bytes(returned) & (1 << ETH_SS_STATS) != 0 {
            buf[4]
        } else {
            0
        };

        self.n_stats = Some(n);
        Ok(n)
    }
}

impl CounterSource for EthtoolSource {
    fn driver(&self) -> &str {
        &self.driver
    }

    fn names(&mut self) -> Result<Vec<String>, SourceError> {
        let count = self.stats_count()?;

        let mut buf = gstrings_request(count);
        self.ioctl("ETHTOOL_GSTRINGS", buf.as_mut_ptr().cast())?;

        let len = buf[2].min(count) as usize;
        let words = ETH_GSTRING_LEN / 4;
        let names = buf[3..]
            .chunks_exact(words)
            .take(len)
            .map(|chunk| {
                let bytes: Vec<u8> = chunk.iter().flat_map(|w| w.to_ne_bytes()).collect();
                c_string(&bytes)
            })
            .collect();
        Ok(names)
    }

    fn values(&mut self) -> Result<Vec<u64>, SourceError> {
        let count = self.stats_count()?;

        let mut buf = gstats_request(count);
        self.ioctl("ETHTOOL_GSTATS", buf.as_mut_ptr().cast())?;

        let mut values: Vec<u64> = buf[2..]
            .chunks_exact(2)
            .take(buf[1].min(count) as usize)
            .map(|pair| {
                let mut bytes = [0u8; 8];
                bytes[..4].copy_from_slice(&pair[0].to_ne_bytes());
                bytes[4..].copy_from_slice(&pair[1].to_ne_bytes());
                u64::from_ne_bytes(bytes)
            })
            .collect();
        // keep the snapshot aligned with the name list
        values.resize(count as usize, 0);
        Ok(values)
    }
}

/// `struct ethtool_gstrings`: cmd, string_set, len, then `count` names of
/// 32 bytes each.
fn gstrings_request(count: u32) -> Vec<u32> {
    let words = ETH_GSTRING_LEN / 4;
    let mut buf = vec![0u32; 3 + count as usize * words];
    buf[0] = ETHTOOL_GSTRINGS;
    buf[1] = ETH_SS_STATS;
    buf[2] = count;
    buf
}

/// `struct ethtool_stats`: cmd, n_stats, then `count` u64 values.
fn gstats_request(count: u32) -> Vec<u32> {
    let mut buf = vec![0u32; 2 + count as usize * 2];
    buf[0] = ETHTOOL_GSTATS;
    buf[1] = count;
    buf
}

/// Decodes a NUL-padded fixed-size C string.
fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_string() {
        let mut raw = [0u8; 32];
        raw[..5].copy_from_slice(b"ixgbe");
        assert_eq!(c_string(&raw), "ixgbe");
        assert_eq!(c_string(b"no-nul"), "no-nul");
    }

    #[test]
    fn test_layouts() {
        assert_eq!(std::mem::size_of::<DrvInfo>(), 196);
        assert_eq!(std::mem::size_of::<IfReq>(), IFNAMSIZ + std::mem::size_of::<usize>() + 16);
    }

    #[test]
    fn test_request_headers() {
        let buf = gstrings_request(3);
        assert_eq!(buf.len(), 3 + 3 * 8);
        assert_eq!(&buf[..3], &[ETHTOOL_GSTRINGS, ETH_SS_STATS, 3]);

        let buf = gstats_request(3);
        assert_eq!(buf.len(), 2 + 3 * 2);
        assert_eq!(&buf[..2], &[ETHTOOL_GSTATS, 3]);

        assert_eq!(gstats_request(0), [ETHTOOL_GSTATS, 0]);
    }

    #[test]
    fn test_invalid_name() {
        assert!(matches!(
            EthtoolSource::open("a-very-long-interface-name"),
            Err(SourceError::InvalidName(_))
        ));
        assert!(matches!(EthtoolSource::open(""), Err(SourceError::InvalidName(_))));
    }

    #[test]
    fn test_missing_interface() {
        assert!(EthtoolSource::open("nicq-missing0").is_err());
    }
}
