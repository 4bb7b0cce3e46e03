use anyhow::{bail, Context, Result};

/// Parses a byte count such as `512KiB`, `4mb` or `1024`.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();
    let units = [
        ("gib", 1024u64.pow(3)),
        ("mib", 1024u64.pow(2)),
        ("kib", 1024),
        ("gb", 1000u64.pow(3)),
        ("mb", 1000u64.pow(2)),
        ("kb", 1000),
        ("g", 1000u64.pow(3)),
        ("m", 1000u64.pow(2)),
        ("k", 1000),
        ("b", 1),
    ];

    for (unit, mult) in units {
        if let Some(value) = s.strip_suffix(unit) {
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid size: {s}"))?;
            if !value.is_finite() || value < 0.0 {
                bail!("Invalid size: {s}");
            }
            return Ok((value * mult as f64) as u64);
        }
    }
    s.parse().with_context(|| format!("Invalid size: {s}"))
}

pub fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
