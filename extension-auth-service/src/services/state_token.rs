//! State token issuer.
//!
//! Produces the opaque correlation identifiers that key the pending-request
//! registry. Tokens act as bearer capabilities for poll/verify, so they must
//! be unguessable.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

/// 128 bits of entropy keeps the collision probability negligible against
/// the expected registry size (thousands of concurrent entries).
const STATE_TOKEN_BYTES: usize = 16;

/// Issue a new URL-safe state token from the OS CSPRNG.
///
/// Entropy source exhaustion is a fatal process error; `OsRng` panics
/// rather than returning weak output.
pub fn issue() -> String {
    let mut buf = [0u8; STATE_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
