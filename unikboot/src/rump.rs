//! # Rump Configuration Encoding
//!
//! Rump kernels read their boot configuration as a JSON object in which every
//! block device gets its own `blk` key:
//!
//! ```text
//! {"rc":[...],"blk": {"source":"dev","path":"/dev/ld0a"},"blk": {"source":"dev","path":"/dev/ld1a"}}
//! ```
//!
//! With two devices or more the same key shows up several times, which strict
//! JSON parsers reject but the unikernel config parser expects. Serde alone
//! would emit an array, hence [to_rump_json].

use tracing::{trace, warn};
use unikboot_models::models::RumpConfig;

/// Encode `config` the way the unikernel expects it.
///
/// Every field but `blk` is serialized as usual; each block device is then
/// appended, in order, as its own `"blk": {...}` entry. Without block devices
/// the output is exactly the serde encoding of `config`.
///
/// Keys of `config.extra` that shadow a typed field are left out.
pub fn to_rump_json(config: &RumpConfig) -> Result<String, serde_json::Error> {
    let mut base = config.clone();
    let blk = std::mem::take(&mut base.blk);
    for key in RumpConfig::TYPED_KEYS {
        if base.extra.remove(key).is_some() {
            warn!("Ignoring {:?} from the extra fields of the rump config", key);
        }
    }

    let json = serde_json::to_string(&base)?;

    let entries = blk
        .iter()
        .map(|b| serde_json::to_string(b).map(|b| format!("\"blk\": {}", b)))
        .collect::<Result<Vec<_>, _>>()?;

    if entries.is_empty() {
        return Ok(json);
    }

    // the base always encodes as an object: drop its closing brace
    let body = &json[..json.len() - 1];
    let separator = if body == "{" { "" } else { "," };
    let encoded = format!("{}{}{}}}", body, separator, entries.join(","));
    trace!("Rump config: {}", encoded);
    Ok(encoded)
}
