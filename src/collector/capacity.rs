//! Capacity derivation from the ManagedCluster capacity map
//!
//! Every capacity field follows the same contract: a reported quantity
//! yields its integer value, an absent or unparsable one yields zero.
//! Zero here means "not reported", never "unknown".

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use tracing::debug;

use crate::crd::{ManagedCluster, ManagedClusterInfo};

/// Standard CPU resource kind
pub const RESOURCE_CPU: &str = "cpu";
/// CPU on worker nodes only
pub const RESOURCE_CPU_WORKER: &str = "cpu_worker";
/// Physical cores
pub const RESOURCE_CORE: &str = "core";
/// Physical cores on worker nodes only
pub const RESOURCE_CORE_WORKER: &str = "core_worker";
/// CPU sockets
pub const RESOURCE_SOCKET: &str = "socket";
/// CPU sockets on worker nodes only
pub const RESOURCE_SOCKET_WORKER: &str = "socket_worker";

/// Label key marking a node as a worker
pub const WORKER_LABEL: &str = "node-role.kubernetes.io/worker";

/// Capacity counts derived for one managed cluster
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capacity {
    /// Total CPU
    pub cpu: i64,
    /// Worker CPU
    pub cpu_worker: i64,
    /// Total cores
    pub core: i64,
    /// Worker cores
    pub core_worker: i64,
    /// Total sockets
    pub socket: i64,
    /// Worker sockets
    pub socket_worker: i64,
}

/// Derive the six capacity fields from a ManagedCluster
pub fn derive_capacity(cluster: &ManagedCluster) -> Capacity {
    let count = |resource: &str| -> i64 {
        match cluster.capacity(resource) {
            Some(quantity) => quantity_value(quantity).unwrap_or_else(|| {
                debug!(%resource, quantity = %quantity.0, "unparsable capacity, using 0");
                0
            }),
            None => 0,
        }
    };

    Capacity {
        cpu: count(RESOURCE_CPU),
        cpu_worker: count(RESOURCE_CPU_WORKER),
        core: count(RESOURCE_CORE),
        core_worker: count(RESOURCE_CORE_WORKER),
        socket: count(RESOURCE_SOCKET),
        socket_worker: count(RESOURCE_SOCKET_WORKER),
    }
}

/// Returns true if any node of the cluster carries the worker role label
pub fn has_worker_node(info: &ManagedClusterInfo) -> bool {
    info.status
        .as_ref()
        .map(|s| s.node_list.iter().any(|n| n.has_label(WORKER_LABEL)))
        .unwrap_or(false)
}

/// Integer value of a Kubernetes quantity, rounded up
///
/// Accepts the canonical quantity forms: plain numbers, decimal SI
/// suffixes (`m`, `k`, `M`, ...), binary suffixes (`Ki`, `Mi`, ...) and
/// decimal exponents (`1e3`). Arithmetic is exact; only a non-zero
/// fractional remainder rounds up. Negative values clamp to zero and
/// values beyond `i64` saturate.
pub fn quantity_value(quantity: &Quantity) -> Option<i64> {
    let (number, scale) = split_suffix(quantity.0.trim())?;
    let (negative, unsigned) = match number.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, number.strip_prefix('+').unwrap_or(number)),
    };

    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return None;
    }
    if negative {
        return Some(0);
    }

    let fraction = fraction.trim_end_matches('0');
    let digits = format!("{}{}", whole.trim_start_matches('0'), fraction);
    let mantissa: i128 = if digits.is_empty() {
        0
    } else {
        digits.parse().ok()?
    };
    let numerator = mantissa.saturating_mul(1024i128.pow(scale.binary));
    let exponent = scale.decimal - fraction.len() as i32;

    let value = if exponent >= 0 {
        match 10i128.checked_pow(exponent.unsigned_abs()) {
            Some(factor) => numerator.saturating_mul(factor),
            None if numerator == 0 => 0,
            None => i128::MAX,
        }
    } else {
        match 10i128.checked_pow(exponent.unsigned_abs()) {
            Some(divisor) if numerator % divisor == 0 => numerator / divisor,
            Some(divisor) => numerator / divisor + 1,
            // divisor exceeds any numerator
            None => i128::from(numerator != 0),
        }
    };
    Some(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Scaling applied by a quantity suffix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Scale {
    /// Power of ten
    decimal: i32,
    /// Power of 1024
    binary: u32,
}

impl Scale {
    fn decimal(power: i32) -> Self {
        Self {
            decimal: power,
            binary: 0,
        }
    }

    fn binary(power: u32) -> Self {
        Self {
            decimal: 0,
            binary: power,
        }
    }
}

fn split_suffix(raw: &str) -> Option<(&str, Scale)> {
    const BINARY: [(&str, u32); 6] = [
        ("Ki", 1),
        ("Mi", 2),
        ("Gi", 3),
        ("Ti", 4),
        ("Pi", 5),
        ("Ei", 6),
    ];

    for (suffix, power) in BINARY {
        if let Some(number) = raw.strip_suffix(suffix) {
            return Some((number, Scale::binary(power)));
        }
    }

    // Exponent form: "E" only counts as an exponent when digits follow it
    if let Some(pos) = raw.find(['e', 'E']) {
        let exponent = &raw[pos + 1..];
        if !exponent.is_empty() {
            return Some((&raw[..pos], Scale::decimal(exponent.parse().ok()?)));
        }
    }

    let power = match raw.chars().last()? {
        'n' => -9,
        'u' => -6,
        'm' => -3,
        'k' => 3,
        'M' => 6,
        'G' => 9,
        'T' => 12,
        'P' => 15,
        'E' => 18,
        _ => return Some((raw, Scale::decimal(0))),
    };
    Some((&raw[..raw.len() - 1], Scale::decimal(power)))
}
