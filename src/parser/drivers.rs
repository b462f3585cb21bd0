//! Builtin naming conventions for known NIC drivers.

use crate::error::RegistryError;

use super::{DriverParser, FusedParser, PatternPairParser, PatternSpec, StatefulParser};

/// Driver name used for the generic fallback parser.
pub const GENERIC: &str = "generic";

/// A parser together with every driver identifier that uses it.
#[derive(Debug, Clone)]
pub struct DriverEntry {
    pub drivers: Vec<String>,
    pub parser: DriverParser,
}

impl DriverEntry {
    fn new(drivers: &[&str], parser: impl Into<DriverParser>) -> Self {
        Self {
            drivers: drivers.iter().map(|d| d.to_string()).collect(),
            parser: parser.into(),
        }
    }
}

/// Totals named `rx_bytes`, `tx_packets` etc.
fn total_generic() -> PatternSpec {
    PatternSpec::new(r"(rx|tx)_(bytes|packets)", 1, 2)
}

/// Broadcom `[N]: rx_bytes` per-queue lines.
fn queue_broadcom() -> PatternSpec {
    PatternSpec::new(r"\[(\d+)\]: (rx|tx)_(bytes|[bum]cast_packets)", 2, 3).with_queue(1)
}

/// Every builtin driver family.
pub fn builtin() -> Result<Vec<DriverEntry>, RegistryError> {
    Ok(vec![
        // Broadcom
        DriverEntry::new(
            &["bnxt_en"],
            PatternPairParser::new(
                Some(&PatternSpec::new(r"(rx|tx)_(bytes|[bum]cast_frames)", 1, 2)),
                Some(&queue_broadcom()),
            )?,
        ),
        DriverEntry::new(
            &["bnx2"],
            PatternPairParser::new(
                Some(&PatternSpec::new(r"(rx|tx)_(bytes|[bum]cast_packets)", 1, 2)),
                Some(&queue_broadcom()),
            )?,
        ),
        DriverEntry::new(
            &["bnx2x"],
            PatternPairParser::new(
                Some(&PatternSpec::new(r"(rx|tx)_(bytes|[bum]cast_packets)", 1, 2)),
                None,
            )?,
        ),
        DriverEntry::new(
            &["tg3"],
            PatternPairParser::new(
                Some(&PatternSpec::new(r"(rx|tx)_(octets|[bum]cast_packets)", 1, 2)),
                None,
            )?,
        ),
        // Intel
        DriverEntry::new(
            &["ixgbe", "igb"],
            FusedParser::dnm(r"(rx|tx)_queue_(\d+)_(bytes|packets)")?,
        ),
        DriverEntry::new(
            &["i40e"],
            FusedParser::new(
                &PatternSpec::new(r"(rx|tx)-(\d+)\.(rx|tx)_(bytes|packets)", 1, 4)
                    .with_queue(2)
                    .with_echo(3),
            )?,
        ),
        // Mellanox
        DriverEntry::new(
            &["mlx5_core", "mlx4_en"],
            PatternPairParser::new(
                Some(&total_generic()),
                Some(&PatternSpec::new(r"(rx|tx)(\d+)_(?:0_)?(bytes|packets)", 1, 3).with_queue(2)),
            )?,
        ),
        // NXP
        DriverEntry::new(
            &["fsl_dpaa2_eth"],
            PatternPairParser::new(
                Some(&PatternSpec::new(r"\[hw\] (rx|tx) (bytes|frames)", 1, 2)),
                None,
            )?,
        ),
        // VMware
        DriverEntry::new(
            &["vmxnet3"],
            StatefulParser::new(r"(rx|tx) queue#", r"\s*[bum]cast (pkts|bytes) (?:rx|tx)")?,
        ),
    ])
}

/// Parser for the most common naming convention, used when the caller asks
/// for a fallback on an unknown driver.
pub fn generic() -> Result<DriverParser, RegistryError> {
    Ok(PatternPairParser::new(
        Some(&total_generic()),
        Some(&PatternSpec::new(r"(rx|tx)_queue_(\d+)_(bytes|packets)", 1, 3).with_queue(2)),
    )?
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Slot;
    use crate::parser::ParseContext;

    fn parser_for(driver: &str) -> DriverParser {
        builtin()
            .unwrap()
            .into_iter()
            .find(|e| e.drivers.iter().any(|d| d == driver))
            .unwrap()
            .parser
    }

    #[test]
    fn test_builtin_compiles() {
        let entries = builtin().unwrap();
        assert_eq!(entries.len(), 9);
        generic().unwrap();
    }

    #[test]
    fn test_mellanox() {
        let p = parser_for("mlx5_core");
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_total("rx_bytes"), Some(Slot::RX_BYTES));
        assert_eq!(p.classify_queue(&mut ctx, "rx3_bytes", 0), Some((Slot::RX_BYTES, 3)));
        assert_eq!(p.classify_queue(&mut ctx, "tx12_0_packets", 0), Some((Slot::TX_PACKETS, 12)));
        assert_eq!(p.classify_queue(&mut ctx, "rx_vport_unicast_bytes", 0), None);
    }

    #[test]
    fn test_i40e() {
        let p = parser_for("i40e");
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_queue(&mut ctx, "rx-0.rx_bytes", 0), Some((Slot::RX_BYTES, 0)));
        assert_eq!(p.classify_queue(&mut ctx, "tx-7.tx_packets", 0), Some((Slot::TX_PACKETS, 7)));
        assert_eq!(p.classify_queue(&mut ctx, "tx-7.rx_packets", 0), None);
        assert_eq!(p.classify_total("rx_bytes"), None);
    }

    #[test]
    fn test_nxp() {
        let p = parser_for("fsl_dpaa2_eth");
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_total("[hw] rx bytes"), Some(Slot::RX_BYTES));
        assert_eq!(p.classify_total("[hw] tx frames"), Some(Slot::TX_PACKETS));
        assert_eq!(p.classify_queue(&mut ctx, "[hw] rx bytes", 0), None);
    }

    #[test]
    fn test_tg3_has_no_queues() {
        let p = parser_for("tg3");
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_total("rx_octets"), Some(Slot::RX_BYTES));
        assert_eq!(p.classify_queue(&mut ctx, "[0]: rx_bytes", 0), None);
    }

    #[test]
    fn test_generic() {
        let p = generic().unwrap();
        let mut ctx = ParseContext::new();
        assert_eq!(p.classify_total("tx_packets"), Some(Slot::TX_PACKETS));
        assert_eq!(p.classify_queue(&mut ctx, "rx_queue_1_bytes", 0), Some((Slot::RX_BYTES, 1)));
    }
}
