//! Loading the directory through the source, credential and cache

#[cfg(test)]
mod tests {
    use crate::fixtures::{RAW_DIRECTORY_JSON, write_fixture};
    use orgdir::io::cache::{CacheStore, DIRECTORY_TTL, ManualClock};
    use orgdir::io::source::{
        EnvToken, JsonFileSource, SessionToken, StaticToken, TokenProvider, load_directory,
    };
    use orgdir::io::store::MemoryStore;
    use orgdir::Error;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Counts acquisitions; fails when `token` is `None`.
    struct CountingToken {
        calls: Rc<Cell<u32>>,
        token: Option<&'static str>,
    }

    impl TokenProvider for CountingToken {
        fn acquire(&self) -> orgdir::Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.token
                .map(str::to_string)
                .ok_or_else(|| Error::Auth("no account signed in".to_string()))
        }
    }

    #[test]
    fn test_load_fetches_then_serves_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(temp_dir.path(), "directory.json", RAW_DIRECTORY_JSON).unwrap();
        let source = JsonFileSource::new(&path);
        let clock = ManualClock::at(1_000);
        let mut cache = CacheStore::with_clock(MemoryStore::new(), clock.clone());
        let mut token = SessionToken::new(StaticToken("t".to_string()));

        let first = load_directory(&source, &mut token, &mut cache).unwrap();
        assert_eq!(first.orgs().len(), 2);
        assert_eq!(first.employees().len(), 2);

        fs::remove_file(&path).unwrap();
        let cached = load_directory(&source, &mut token, &mut cache).unwrap();
        assert_eq!(cached.employees(), first.employees());

        clock.advance(DIRECTORY_TTL);
        let err = load_directory(&source, &mut token, &mut cache).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_malformed_payload_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(temp_dir.path(), "directory.json", "{\"orgList\": 3}").unwrap();
        let mut cache = CacheStore::new(MemoryStore::new());
        let mut token = SessionToken::new(StaticToken("t".to_string()));

        let err = load_directory(&JsonFileSource::new(&path), &mut token, &mut cache).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_session_token_is_acquired_once() {
        let calls = Rc::new(Cell::new(0));
        let mut token = SessionToken::new(CountingToken {
            calls: Rc::clone(&calls),
            token: Some("secret"),
        });
        assert_eq!(token.get().unwrap(), "secret");
        assert_eq!(token.get().unwrap(), "secret");
        assert_eq!(calls.get(), 1);

        let failed_calls = Rc::new(Cell::new(0));
        let mut failing = SessionToken::new(CountingToken {
            calls: Rc::clone(&failed_calls),
            token: None,
        });
        assert!(matches!(failing.get(), Err(Error::Auth(_))));
        assert!(matches!(failing.get(), Err(Error::Auth(_))));
        assert_eq!(failed_calls.get(), 2);
    }

    #[test]
    fn test_auth_failure_stops_the_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_fixture(temp_dir.path(), "directory.json", RAW_DIRECTORY_JSON).unwrap();
        let mut cache = CacheStore::new(MemoryStore::new());
        let mut token = SessionToken::new(CountingToken {
            calls: Rc::new(Cell::new(0)),
            token: None,
        });

        let err = load_directory(&JsonFileSource::new(&path), &mut token, &mut cache).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_env_token() {
        let unset = EnvToken::new("ORGDIR_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(matches!(unset.acquire(), Err(Error::Auth(_))));

        let fallback = EnvToken::new("ORGDIR_TEST_TOKEN_THAT_IS_NEVER_SET").with_fallback("local");
        assert_eq!(fallback.acquire().unwrap(), "local");
    }
}
