#![no_main]

use keyprotect::provider::DefaultProvider;
use keyprotect::unprotect;
use libfuzzer_sys::fuzz_target;

// `unprotect` is this core's attack surface: it runs the S2K KDF, decrypts
// with a key derived from attacker-controlled salt/count, then reparses
// and splices whatever came out of AES-CBC. The plausibility gate and the
// MIC comparison are what stand between that and handing a caller a
// malformed clear key, so this target hands the whole buffer straight to
// unprotect with a fixed passphrase and asserts only that it never panics.
fuzz_target!(|data: &[u8]| {
    let provider = DefaultProvider;
    let _ = unprotect(data, b"hunter2", &provider);
});
