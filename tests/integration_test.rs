//! Integration tests for the capture-to-script pipeline

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use tcpload::config::Config;
use tcpload::params::{Param, ParamValue};
use tcpload::script::template::{self, TestCaseNames};
use tcpload::script::{Target, DESCRIPTION_MAX_LEN};
use tcpload::{Recorder, RecorderError};

/// Write one capture file
fn write_capture(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Write a complete request/response pair
fn write_exchange(dir: &Path, id: &str, request: &str, response: &str) {
    write_capture(dir, &format!("watch{id}.request"), request);
    write_capture(dir, &format!("watch{id}.response"), response);
}

/// Recorder over `capture`, writing uploads into `uploads`
fn recorder(capture: &TempDir, uploads: &TempDir) -> Recorder {
    let mut config = Config::new(capture.path());
    config.upload_dir = uploads.path().to_path_buf();
    config.output_dir = uploads.path().to_path_buf();
    Recorder::new(config)
}

/// Record the login session: login form, POST, redirect follow-up, css
fn write_login_session(dir: &Path) {
    write_exchange(
        dir,
        "0001",
        "GET http://shop.example.com/login HTTP/1.1\r\n\
         Host: shop.example.com\r\n\r\n",
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html\r\n\r\n\
         <form method=post></form>",
    );
    write_exchange(
        dir,
        "0002",
        "POST http://shop.example.com/login HTTP/1.1\r\n\
         Host: shop.example.com\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 26\r\n\r\n\
         user=alice&password=s3cr3t",
        "HTTP/1.1 302 Found\r\n\
         Location: http://shop.example.com/home\r\n\r\n",
    );
    write_exchange(
        dir,
        "0003",
        "GET http://shop.example.com/home HTTP/1.1\r\n\
         Host: shop.example.com\r\n\r\n",
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/html\r\n\r\n\
         <html></html>",
    );
    write_exchange(
        dir,
        "0004",
        "GET http://shop.example.com/home.css HTTP/1.1\r\n\
         Host: shop.example.com\r\n\r\n",
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/css\r\n\r\n\
         body {}",
    );
}

#[test]
fn test_login_session_end_to_end() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    write_login_session(capture.path());

    let script = recorder(&capture, &uploads).convert().unwrap().unwrap();
    let instructions = script.instructions();

    assert_eq!(script.server_url(), "http://shop.example.com");
    assert_eq!(instructions.len(), 2);

    assert_eq!(instructions[0].method, "GET");
    assert_eq!(instructions[0].target, Target::Session("/login".to_string()));
    assert_eq!(instructions[0].params, None);
    assert_eq!(instructions[0].description, "Get /login");

    assert_eq!(instructions[1].method, "POST");
    assert_eq!(
        instructions[1].params,
        Some(vec![
            Param::literal("user", "alice"),
            Param::literal("password", "s3cr3t"),
        ])
    );
    assert_eq!(instructions[1].description, "Post /login");

    let rendered = script.render();
    assert_eq!(
        rendered,
        "\n\n        self.get(server_url + \"/login\",\
         \n            description=\"Get /login\")\
         \n\n        self.post(server_url + \"/login\", params=[\
         \n            ['user', 'alice'],\
         \n            ['password', 's3cr3t']],\
         \n            description=\"Post /login\")"
    );
}

#[test]
fn test_incomplete_and_errored_exchanges_skipped() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();

    write_exchange(
        capture.path(),
        "0001",
        "GET http://example.com/ HTTP/1.1\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n",
    );
    // Proxy interrupted before the response was written
    write_capture(
        capture.path(),
        "watch0002.request",
        "GET http://example.com/lost HTTP/1.1\r\n\r\n",
    );
    // Transport error while talking to the server
    write_exchange(
        capture.path(),
        "0003",
        "GET http://example.com/broken HTTP/1.1\r\n\r\n",
        "HTTP/1.1 200 OK\r\n\r\n",
    );
    write_capture(capture.path(), "watch0003.errors", "connection reset");

    let script = recorder(&capture, &uploads).convert().unwrap().unwrap();
    let descriptions: Vec<&str> = script
        .instructions()
        .iter()
        .map(|i| i.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Get /"]);
}

#[test]
fn test_unexpected_extension_aborts() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    write_login_session(capture.path());
    write_capture(capture.path(), "watch0005.tmp", "");

    let err = recorder(&capture, &uploads).convert().unwrap_err();
    assert!(matches!(err, RecorderError::UnexpectedExtension { .. }));
}

#[test]
fn test_malformed_capture_aborts() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    write_login_session(capture.path());
    write_exchange(capture.path(), "0005", "garbage\r\n\r\n", "HTTP/1.1 200 OK\r\n\r\n");

    let err = recorder(&capture, &uploads).convert().unwrap_err();
    match err {
        RecorderError::InvalidCapture { path, source } => {
            assert!(path.ends_with("watch0005.request"));
            assert!(matches!(*source, RecorderError::MalformedStartLine { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_capture_yields_nothing() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    write_capture(
        capture.path(),
        "watch0001.request",
        "GET http://example.com/ HTTP/1.1\r\n\r\n",
    );

    assert!(recorder(&capture, &uploads).convert().unwrap().is_none());
}

#[test]
fn test_only_noise_yields_nothing() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    write_exchange(
        capture.path(),
        "0001",
        "GET http://example.com/logo.gif HTTP/1.1\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Type: image/gif\r\n\r\n",
    );

    assert!(recorder(&capture, &uploads).convert().unwrap().is_none());
}

#[test]
fn test_upload_written_once() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();

    let body = "--AaB03x\r\n\
                Content-Disposition: form-data; name=\"caption\"\r\n\r\n\
                Sunset\r\n\
                --AaB03x\r\n\
                Content-Disposition: form-data; name=\"file\"; filename=\"photo.jpg\"\r\n\
                Content-Type: image/jpeg\r\n\r\n\
                recorded-bytes\r\n\
                --AaB03x--\r\n";
    let request = format!(
        "POST http://example.com/upload HTTP/1.1\r\n\
         Content-Type: multipart/form-data; boundary=AaB03x\r\n\
         Content-Length: {}\r\n\r\n{body}",
        body.len()
    );
    write_exchange(
        capture.path(),
        "0001",
        &request,
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n",
    );

    let script = recorder(&capture, &uploads).convert().unwrap().unwrap();
    let params = script.instructions()[0].params.clone().unwrap();
    assert_eq!(params[0], Param::literal("caption", "Sunset"));
    assert_eq!(params[1].value, ParamValue::Upload("photo.jpg".to_string()));
    assert!(script
        .render()
        .contains("['file', Upload(\"photo.jpg\")]"));

    let saved = uploads.path().join("photo.jpg");
    assert_eq!(fs::read(&saved).unwrap(), b"recorded-bytes");

    // A second run against an existing file keeps its content
    fs::write(&saved, b"edited-by-user").unwrap();
    let script = recorder(&capture, &uploads).convert().unwrap().unwrap();
    assert_eq!(script.instructions().len(), 1);
    assert_eq!(fs::read(&saved).unwrap(), b"edited-by-user");
}

#[test]
fn test_third_party_origin_kept_absolute() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    write_exchange(
        capture.path(),
        "0001",
        "GET http://example.com/ HTTP/1.1\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n",
    );
    write_exchange(
        capture.path(),
        "0002",
        "GET https://accounts.example.org/session?next=%2F HTTP/1.1\r\n\r\n",
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{}",
    );

    let script = recorder(&capture, &uploads).convert().unwrap().unwrap();
    assert_eq!(
        script.instructions()[1].target,
        Target::Absolute("https://accounts.example.org/session?next=%2F".to_string())
    );
}

#[test]
fn test_long_paths_truncated() {
    let capture = TempDir::new().unwrap();
    let uploads = TempDir::new().unwrap();
    let path = "/catalog/category/electronics/televisions/oled/65-inch";
    write_exchange(
        capture.path(),
        "0001",
        &format!("GET http://example.com{path} HTTP/1.1\r\n\r\n"),
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n",
    );

    let script = recorder(&capture, &uploads).convert().unwrap().unwrap();
    let description = &script.instructions()[0].description;
    assert!(description.chars().count() <= DESCRIPTION_MAX_LEN);
    assert!(description.ends_with("..."));
}

#[test]
fn test_write_test_case_files() {
    let capture = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_login_session(capture.path());

    let script = recorder(&capture, &output).convert().unwrap().unwrap();
    let names = TestCaseNames::new("shop_login", output.path()).unwrap();

    assert!(template::write_new(
        &names.script_path,
        &template::render_test_case(&script, &names)
    )
    .unwrap());
    assert!(template::write_new(
        &names.configuration_path,
        &template::render_configuration(script.server_url(), &names)
    )
    .unwrap());

    let test_case = fs::read_to_string(output.path().join("test_ShopLogin.py")).unwrap();
    assert!(test_case.contains("class ShopLogin(FunkLoadTestCase):"));
    assert!(test_case.contains("self.post(server_url + \"/login\", params=["));

    let configuration = fs::read_to_string(output.path().join("ShopLogin.conf")).unwrap();
    assert!(configuration.contains("url=http://shop.example.com"));

    // Existing files are left alone
    assert!(!template::write_new(&names.configuration_path, "replaced").unwrap());
    assert_eq!(
        fs::read_to_string(&names.configuration_path).unwrap(),
        configuration
    );
}
