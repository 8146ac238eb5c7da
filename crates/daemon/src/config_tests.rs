use super::*;
use serial_test::serial;

#[test]
#[serial]
fn base_dir_honors_env_override() {
    std::env::set_var("JERMINAL_BASE_DIR", "/tmp/custom-jerminal-base");
    assert_eq!(base_dir(), PathBuf::from("/tmp/custom-jerminal-base"));
    std::env::remove_var("JERMINAL_BASE_DIR");
}

#[test]
#[serial]
fn socket_path_honors_env_override() {
    std::env::set_var("JERMINAL_SOCKET_PATH", "/tmp/custom.sock");
    assert_eq!(socket_path(), PathBuf::from("/tmp/custom.sock"));
    std::env::remove_var("JERMINAL_SOCKET_PATH");
}

#[test]
#[serial]
fn socket_path_defaults_when_unset() {
    std::env::remove_var("JERMINAL_SOCKET_PATH");
    assert_eq!(socket_path(), PathBuf::from("/tmp/pipeline-control.sock"));
}
