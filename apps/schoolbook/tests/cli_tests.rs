//! Integration tests for Schoolbook CLI commands.
//!
//! Uses tempfile for file-based operations and wiremock for the backend.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use schoolbook::cli::{
    cmd_create, cmd_dashboard, cmd_delete, cmd_delete_all, cmd_export, cmd_grid, cmd_import,
    cmd_list, cmd_roster, cmd_template,
};
use schoolbook::config::GridArgs;
use schoolbook::shell::{Flow, Shell};
use schoolbook_client::SchoolClient;
use schoolbook_core::{AttendanceStatus, ClassId, CommitDefaults, StudentId, SubjectId, TeacherId};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true, "data": data}))
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

/// Write a JSON record file for create/update commands.
fn create_record_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

async fn mount_students(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/student/getall"))
        .respond_with(ok(serde_json::json!([
            {"student_id": 1, "studentname_en": "Sokha", "studentname_kh": "សុខា", "gender": "F", "class_code": "IT-A"},
            {"student_id": 2, "studentname_en": "Dara", "studentname_kh": "ដារា", "gender": "M", "class_code": "IT-A"},
            {"student_id": 3, "studentname_en": "Sophea", "studentname_kh": "សុភា", "gender": "F", "class_code": "BM-B"}
        ])))
        .mount(server)
        .await;
}

/// Two students; Sokha was Late on Monday 2026-10-12.
async fn mount_grid(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/attendance/weekly-grid"))
        .and(query_param("classId", "3"))
        .respond_with(ok(serde_json::json!({
            "students": [
                {
                    "student_id": 1,
                    "student_name_kh": "សុខា",
                    "student_name_eng": "Sokha",
                    "gender": "F",
                    "attendance_rate": "92%",
                    "daily_attendance": {"2026-10-12": [{"status": "Late", "subject_id": 4}]}
                },
                {
                    "student_id": 2,
                    "student_name_kh": "ដារា",
                    "student_name_eng": "Dara",
                    "gender": "M",
                    "daily_attendance": {}
                }
            ]
        })))
        .mount(server)
        .await;
}

// =============================================================================
// LIST COMMAND TESTS
// =============================================================================

#[tokio::test]
async fn test_list_highlights_search() {
    let server = MockServer::start().await;
    mount_students(&server).await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    cmd_list(client.students(), "so", &mut out).await.unwrap();
    let out = output(out);

    assert!(out.contains("[So]kha"));
    assert!(out.contains("[So]phea"));
    assert!(!out.contains("Dara"));
    assert!(out.contains("2 student(s)"));
}

#[tokio::test]
async fn test_roster_filters_gender() {
    let server = MockServer::start().await;
    mount_students(&server).await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    cmd_roster(&client, "", "M", &mut out).await.unwrap();
    let out = output(out);

    assert!(out.contains("Dara"));
    assert!(!out.contains("Sokha"));
    assert!(out.contains("1 student(s)"));
}

#[tokio::test]
async fn test_list_reports_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teacher/getall"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "message": "Database unavailable"
        })))
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    let err = cmd_list(client.teachers(), "", &mut out).await.unwrap_err();
    assert!(err.to_string().contains("Database unavailable"));
}

// =============================================================================
// CREATE / DELETE COMMAND TESTS
// =============================================================================

#[tokio::test]
async fn test_create_from_file() {
    let temp = create_temp_dir();
    let file = create_record_file(
        &temp,
        "class.json",
        r#"{"class_code": "IT-C", "class_year": "2026", "room_number": "B12"}"#,
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/class/create"))
        .and(body_partial_json(serde_json::json!({"class_code": "IT-C", "room_number": "B12"})))
        .respond_with(ok(serde_json::json!({"class_id": 12, "class_code": "IT-C"})))
        .expect(1)
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    cmd_create(client.classes(), &file, &mut out).await.unwrap();
    assert_eq!(output(out).trim(), "Created class 12");
}

#[tokio::test]
async fn test_create_rejects_invalid_email() {
    let temp = create_temp_dir();
    let file = create_record_file(
        &temp,
        "teacher.json",
        r#"{"teachername_en": "Sophea", "teachername_kh": "សុភា", "email": "sophea-at-school"}"#,
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/teacher/create"))
        .respond_with(ok(serde_json::json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    let err = cmd_create(client.teachers(), &file, &mut out).await.unwrap_err();
    assert!(err.to_string().contains("invalid email"));
}

#[tokio::test]
async fn test_create_missing_file() {
    let temp = create_temp_dir();
    let client = SchoolClient::new("http://127.0.0.1:1");

    let mut out = Vec::new();
    let result = cmd_create(client.subjects(), &temp.path().join("missing.json"), &mut out).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/subject/delete/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Subject deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    assert!(cmd_delete(client.subjects(), SubjectId(4), false, &mut out).await.is_err());

    cmd_delete(client.subjects(), SubjectId(4), true, &mut out).await.unwrap();
    assert_eq!(output(out).trim(), "Subject deleted");
}

#[tokio::test]
async fn test_delete_all_requires_confirmation() {
    let client = SchoolClient::new("http://127.0.0.1:1");
    let mut out = Vec::new();
    assert!(cmd_delete_all(&client, false, &mut out).await.is_err());
}

// =============================================================================
// FILE COMMAND TESTS
// =============================================================================

#[tokio::test]
async fn test_export_writes_workbook() {
    let temp = create_temp_dir();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/class/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04workbook".to_vec()))
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    let saved = cmd_export(client.classes(), temp.path(), &mut out).await.unwrap();

    let name = saved.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("classes_export_"));
    assert!(name.ends_with(".xlsx"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04workbook");
}

#[tokio::test]
async fn test_template_download() {
    let temp = create_temp_dir();
    let target = temp.path().join("template.xlsx");
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/student/download-template"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK-template".to_vec()))
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    cmd_template(&client, &target, &mut out).await.unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"PK-template");
}

#[tokio::test]
async fn test_import_reports_rows() {
    let temp = create_temp_dir();
    let workbook = temp.path().join("roster.xlsx");
    std::fs::write(&workbook, b"PK").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/student/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Upload processed",
            "summary": {"totalRowsInFile": 2},
            "newlyCreated": [{"student_id": 50, "studentname_en": "Vanna", "studentname_kh": "វណ្ណា"}],
            "errors": [{"row": 3, "message": "Missing name", "data": {}}]
        })))
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    cmd_import(&client, &workbook, &mut out).await.unwrap();
    let out = output(out);

    assert!(out.contains("Rows: 2 | created: 1 | failed: 1"));
    assert!(out.contains("+ 50 Vanna"));
    assert!(out.contains("! row 3: Missing name"));
}

// =============================================================================
// GRID AND DASHBOARD TESTS
// =============================================================================

#[tokio::test]
async fn test_grid_command() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    let client = SchoolClient::new(server.uri());

    let args = GridArgs {
        class: Some(3),
        week_of: Some("2026-10-14".to_string()),
    };
    let mut out = Vec::new();
    cmd_grid(&client, &args, day(14), &mut out).await.unwrap();
    let out = output(out);

    assert!(out.contains("Week 2026-10-11 .. 2026-10-17 | class 3"));
    assert!(out.contains("Sokha"));
    assert!(out.contains("92% (good)"));
    assert!(out.contains("Late 1"));
}

#[tokio::test]
async fn test_grid_requires_class() {
    let client = SchoolClient::new("http://127.0.0.1:1");
    let args = GridArgs {
        class: None,
        week_of: None,
    };
    let mut out = Vec::new();
    assert!(cmd_grid(&client, &args, day(14), &mut out).await.is_err());
}

#[tokio::test]
async fn test_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .respond_with(ok(serde_json::json!({
            "totalStudents": 120,
            "totalTeachers": 9,
            "totalClasses": 6,
            "attendanceRate": 91.5
        })))
        .mount(&server)
        .await;
    let client = SchoolClient::new(server.uri());

    let mut out = Vec::new();
    cmd_dashboard(&client, false, &mut out).await.unwrap();
    let out = output(out);
    assert!(out.contains("Students:        120"));
    assert!(out.contains("Attendance rate: 91.5%"));
}

// =============================================================================
// SHELL TESTS
// =============================================================================

fn shell_defaults() -> CommitDefaults {
    CommitDefaults {
        teacher: TeacherId(7),
        subject: SubjectId(1),
    }
}

async fn open_shell<'a>(client: &'a SchoolClient) -> Shell<'a> {
    let mut shell = Shell::new(client, day(14), shell_defaults(), 20);
    let args = GridArgs {
        class: Some(3),
        week_of: None,
    };
    shell.open(&args).await.unwrap();
    shell
}

#[tokio::test]
async fn test_shell_toggle_cycle() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    let client = SchoolClient::new(server.uri());
    let mut shell = open_shell(&client).await;
    let mut out = Vec::new();

    shell.handle_line("toggle 2 tue", &mut out).await.unwrap();
    assert_eq!(
        shell.board().effective_status(StudentId(2), day(13)),
        Some(AttendanceStatus::Present)
    );
    shell.handle_line("toggle 2 tue", &mut out).await.unwrap();
    assert_eq!(
        shell.board().effective_status(StudentId(2), day(13)),
        Some(AttendanceStatus::Absent)
    );
    shell.handle_line("toggle 2 tue", &mut out).await.unwrap();
    assert_eq!(shell.board().effective_status(StudentId(2), day(13)), None);
    assert!(!shell.board().has_unsaved_changes());

    let out = output(out);
    assert!(out.contains("2 2026-10-13: Present (unsaved)"));
    assert!(out.contains("2 2026-10-13: cleared"));
}

#[tokio::test]
async fn test_shell_unknown_student_is_reported() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    let client = SchoolClient::new(server.uri());
    let mut shell = open_shell(&client).await;
    let mut out = Vec::new();

    let flow = shell.handle_line("toggle 99 mon", &mut out).await.unwrap();
    assert_eq!(flow, Flow::Continue);
    assert!(output(out).contains("error:"));
    assert!(shell.board().last_error().is_some());
}

#[tokio::test]
async fn test_shell_bulk_then_submit() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    Mock::given(method("GET"))
        .and(path("/subject/getall"))
        .respond_with(ok(serde_json::json!([{"subject_id": 4, "subject_name": "Java"}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/attendance/create"))
        .and(body_partial_json(serde_json::json!({
            "attendance_date": "2026-10-15",
            "status": "Excused",
            "subject_id": 4,
            "teacher_id": 7
        })))
        .respond_with(ok(serde_json::json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let mut shell = open_shell(&client).await;
    let mut out = Vec::new();

    for line in [
        "bulk open thu",
        "bulk all",
        "bulk status excused",
        "bulk apply",
    ] {
        shell.handle_line(line, &mut out).await.unwrap();
    }
    assert_eq!(shell.board().overlay().len(), 2);
    assert_eq!(shell.board().bulk().open_date(), None);

    shell.handle_line("submit", &mut out).await.unwrap();
    assert!(!shell.board().has_unsaved_changes());
    assert!(output(out).contains("saved 2 of 2 change(s)"));
}

#[tokio::test]
async fn test_shell_failed_submit_still_clears() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    Mock::given(method("POST"))
        .and(path("/attendance/create"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let mut shell = open_shell(&client).await;
    let mut out = Vec::new();

    shell.handle_line("allpresent mon", &mut out).await.unwrap();
    assert_eq!(shell.board().overlay().len(), 2);

    shell.handle_line("submit", &mut out).await.unwrap();
    assert!(!shell.board().has_unsaved_changes());
    assert_eq!(shell.board().last_error(), Some("Failed to save some changes"));
    assert!(output(out).contains("error: Failed to save some changes"));
}

#[tokio::test]
async fn test_shell_failed_submit_reports_commit_error_over_reload_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/attendance/weekly-grid"))
        .respond_with(ok(serde_json::json!({
            "students": [{"student_id": 1, "student_name_eng": "Sokha", "daily_attendance": {}}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/attendance/create"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let mut shell = open_shell(&client).await;
    let mut out = Vec::new();

    shell.handle_line("mark 1 mon present", &mut out).await.unwrap();
    shell.handle_line("submit", &mut out).await.unwrap();

    assert!(!shell.board().has_unsaved_changes());
    assert_eq!(shell.board().last_error(), Some("Failed to save some changes"));
    assert!(output(out).contains("error: Failed to save some changes"));
}

#[tokio::test]
async fn test_shell_quit_guards_unsaved_changes() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    let client = SchoolClient::new(server.uri());
    let mut shell = open_shell(&client).await;
    let mut out = Vec::new();

    shell.handle_line("mark 1 wed late", &mut out).await.unwrap();
    assert_eq!(shell.handle_line("quit", &mut out).await.unwrap(), Flow::Continue);
    assert_eq!(shell.handle_line("quit!", &mut out).await.unwrap(), Flow::Quit);
}

#[tokio::test]
async fn test_shell_scripted_session() {
    let server = MockServer::start().await;
    mount_grid(&server).await;
    let client = SchoolClient::new(server.uri());
    let mut shell = Shell::new(&client, day(14), shell_defaults(), 20);

    let script = "class 3\nsearch dar\nsummary\ndetail 1 mon\ndiscard\nquit\n";
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out).await.unwrap();
    let out = output(out);

    assert!(out.contains("[Dar]a"));
    assert!(out.contains("search 'dar'"));
    assert!(out.contains("Unmarked 7"));
    assert!(out.contains("Late"));
    assert_eq!(shell.board().class(), Some(ClassId(3)));
}
