use fortivpn_core::cfg::{
    config::Config,
    enums::{CipherAlg, HmacAlg},
};

fn write_temp_yaml(contents: &str) -> tempfile_like::TempYaml {
    tempfile_like::TempYaml::new(contents)
}

/// Tiny drop-on-scope-exit temp file helper; avoids pulling in a `tempfile`
/// dependency for a single test.
mod tempfile_like {
    use std::{
        fs,
        io::Write,
        path::{Path, PathBuf},
        sync::atomic::{AtomicU32, Ordering},
    };

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    pub struct TempYaml {
        path: PathBuf,
    }

    impl TempYaml {
        pub fn new(contents: &str) -> Self {
            let mut path = std::env::temp_dir();
            let unique = format!(
                "fortivpn-core-test-{}-{}.yaml",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::Relaxed)
            );
            path.push(unique);
            let mut f = fs::File::create(&path).expect("create temp yaml");
            f.write_all(contents.as_bytes()).expect("write temp yaml");
            Self { path }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TempYaml {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[test]
fn load_from_file_parses_and_validates() {
    let yaml = r#"
server:
  Host: vpn.example.com
  Port: 443
credentials:
  Username: alice
  Password: hunter2
esp:
  Cipher: aes256
  Hmac: sha1
runtime:
  ConnectTimeout: 10
  DpdFloor: 0
"#;
    let temp = write_temp_yaml(yaml);
    let cfg = Config::load_from_file(temp.path()).expect("config should load");

    assert_eq!(cfg.server.host, "vpn.example.com");
    assert_eq!(cfg.esp.cipher, CipherAlg::Aes256Cbc);
    assert_eq!(cfg.esp.hmac, HmacAlg::Sha1);
    assert_eq!(cfg.esp.replay_window, 64);
    assert_eq!(cfg.runtime.dpd_floor.as_secs(), 10);
}

#[test]
fn load_from_file_rejects_missing_host() {
    let yaml = r#"
server:
  Host: ""
  Port: 443
credentials:
  Username: alice
  Password: hunter2
esp:
  Cipher: aes128
  Hmac: md5
runtime:
  ConnectTimeout: 10
  DpdFloor: 30
"#;
    let temp = write_temp_yaml(yaml);
    assert!(Config::load_from_file(temp.path()).is_err());
}
