/*! Integration tests for yagogame.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - store: The identity store contract, run against every backend
 * - file: File-backed store specifics (seeding, on-disk content, failed writes)
 * - sql: SQL backend specifics (durability, schema, key allocation)
 * - gate: The authentication middleware
 * - service: The account routes end to end
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("yagogame=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod file;
mod helpers;
