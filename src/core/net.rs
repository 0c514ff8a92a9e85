#[cfg(feature = "test-mode")]
use std::env;

use crate::core::FetchUnit;

#[cfg(feature = "test-mode")]
mod fixtures {
    use std::env;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    use crate::core::FetchUnit;

    fn fixture_dir() -> PathBuf {
        env::var("ORDERS_FIXDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
    }

    pub(super) fn record_fixture(
        endpoint: &str,
        unit: FetchUnit,
        body: &str,
    ) -> Result<(), std::io::Error> {
        let dir = fixture_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let path = dir.join(format!("{endpoint}_{}_{}.json", unit.from, unit.to));

        let mut file = fs::File::create(&path)?;
        file.write_all(body.as_bytes())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), "recorded fixture");
        Ok(())
    }
}

/// Read the response body as text.
/// In `test-mode`, if `ORDERS_RECORD=1`, the body is saved as a fixture.
pub(crate) async fn get_text(
    resp: reqwest::Response,
    _endpoint: &str,
    _unit: FetchUnit,
) -> Result<String, reqwest::Error> {
    let text = resp.text().await?;

    #[cfg(feature = "test-mode")]
    {
        if env::var("ORDERS_RECORD").ok().as_deref() == Some("1")
            && let Err(e) = fixtures::record_fixture(_endpoint, _unit, &text)
        {
            eprintln!("ORDERS_RECORD: failed to write fixture for {_unit}: {e}");
        }
    }

    Ok(text)
}
