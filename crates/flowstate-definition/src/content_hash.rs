//! Deterministic content hashing for flow definitions.
//!
//! Produces a SHA-256 hex digest over everything that affects evaluation
//! (step ids, dependencies, automation) plus display fields, so that the
//! same definition yields the same fingerprint whether it was written as
//! TOML or JSON.

use sha2::{Digest, Sha256};

use crate::resolver::Step;

/// Separator byte written between fields.
const SEP: u8 = 0;

/// Computes the fingerprint of a flow from its name and steps in
/// declaration order.
pub fn compute_fingerprint(name: &str, steps: &[Step]) -> String {
    let mut h = Sha256::new();

    write_str(&mut h, name);
    write_int(&mut h, steps.len());

    for step in steps {
        write_str(&mut h, &step.id);
        write_str(&mut h, &step.title);
        write_str(&mut h, &step.description);
        write_int(&mut h, step.needs.len());
        for dep in &step.needs {
            write_str(&mut h, dep);
        }
        write_str_opt(&mut h, step.job_type());
    }

    format!("{:x}", h.finalize())
}

fn write_str(h: &mut Sha256, s: &str) {
    h.update(s.as_bytes());
    h.update([SEP]);
}

fn write_str_opt(h: &mut Sha256, s: Option<&str>) {
    match s {
        Some(s) => {
            h.update([1]);
            write_str(h, s);
        }
        None => h.update([SEP]),
    }
}

fn write_int(h: &mut Sha256, n: usize) {
    h.update((n as u64).to_le_bytes());
    h.update([SEP]);
}
