//! Integration tests for schoolbook-client.
//!
//! Uses wiremock to mock HTTP responses from the school backend.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use schoolbook_client::{COMMIT_FAILED, Error, GENERIC_ERROR, SchoolClient};
use schoolbook_core::{
    AttendanceStatus, AttendanceWrite, Class, ClassId, Student, StudentId, SubjectId, TeacherId,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "success": true,
        "data": data
    }))
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn write(student: u64, status: AttendanceStatus) -> AttendanceWrite {
    AttendanceWrite {
        student_id: StudentId(student),
        subject_id: SubjectId(1),
        attendance_date: day(12),
        status,
        teacher_id: TeacherId(1),
    }
}

// =============================================================================
// RESOURCE CRUD
// =============================================================================

#[tokio::test]
async fn test_list_students() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/student/getall"))
        .respond_with(ok(serde_json::json!([
            {"student_id": 1, "studentname_en": "Sokha", "studentname_kh": "សុខា", "class_code": "IT-A"},
            {"student_id": 2, "studentname_en": "Dara", "studentname_kh": "ដារា"}
        ])))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let students = client.students().list().await.unwrap();

    assert_eq!(students.len(), 2);
    assert_eq!(students[0].student_id, Some(StudentId(1)));
    assert_eq!(students[0].class_code.as_deref(), Some("IT-A"));
    assert_eq!(students[1].studentname_en, "Dara");
}

#[tokio::test]
async fn test_list_with_null_data_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teacher/getall"))
        .respond_with(ok(serde_json::Value::Null))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    assert!(client.teachers().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_class() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/class/3"))
        .respond_with(ok(serde_json::json!({
            "class_id": 3,
            "class_code": "IT-A",
            "class_year": "2026",
            "room_number": "B12"
        })))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let class = client.classes().get(ClassId(3)).await.unwrap();
    assert_eq!(class.class_code, "IT-A");
    assert_eq!(class.room_number.as_deref(), Some("B12"));
}

#[tokio::test]
async fn test_create_sends_wire_names() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/class/create"))
        .and(body_partial_json(serde_json::json!({"class_code": "IT-B"})))
        .respond_with(ok(serde_json::json!({"class_id": 9, "class_code": "IT-B"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let created = client.classes().create(&Class::new("IT-B")).await.unwrap();
    assert_eq!(created.class_id, Some(ClassId(9)));
}

#[tokio::test]
async fn test_update_and_delete() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/student/update/4"))
        .respond_with(ok(serde_json::json!({"student_id": 4, "studentname_en": "Vanna"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/student/delete/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Student deleted"
        })))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let updated = client
        .students()
        .update(StudentId(4), &Student::new("វណ្ណា", "Vanna"))
        .await
        .unwrap();
    assert_eq!(updated.studentname_en, "Vanna");

    let message = client.students().delete(StudentId(4)).await.unwrap();
    assert_eq!(message.as_deref(), Some("Student deleted"));
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

#[tokio::test]
async fn test_success_false_uses_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subject/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Subject code already exists"
        })))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let result = client
        .subjects()
        .create(&schoolbook_core::Subject::new("Java"))
        .await;

    match result {
        Err(Error::Server(msg)) => assert_eq!(msg, "Subject code already exists"),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_success_false_without_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subject/getall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": false})))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    match client.subjects().list().await {
        Err(Error::Server(msg)) => assert_eq!(msg, GENERIC_ERROR),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_with_message_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/student/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "message": "Student not found"
        })))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    match client.students().get(StudentId(77)).await {
        Err(Error::Server(msg)) => assert_eq!(msg, "Student not found"),
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_without_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/class/getall"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    match client.classes().list().await {
        Err(Error::Server(msg)) => {
            assert_eq!(msg, "Error Code: 500\nMessage: Internal Server Error")
        }
        other => panic!("expected server error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/student/getall"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    assert!(matches!(client.students().list().await, Err(Error::Json(_))));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let client = SchoolClient::with_options("http://127.0.0.1:1", None, Duration::from_secs(2)).unwrap();
    assert!(matches!(client.students().list().await, Err(Error::Http(_))));
}

#[tokio::test]
async fn test_api_key_sent_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teacher/getall"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ok(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = SchoolClient::with_options(server.uri(), Some("s3cret"), Duration::from_secs(5)).unwrap();
    client.teachers().list().await.unwrap();
}

#[tokio::test]
async fn test_default_client_sends_no_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teacher/getall"))
        .respond_with(ok(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = SchoolClient::new(format!("{}/", server.uri()));
    assert_eq!(client.base_url(), server.uri());
    client.teachers().list().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

// =============================================================================
// BLOBS AND UPLOAD
// =============================================================================

#[tokio::test]
async fn test_export_returns_raw_bytes() {
    let server = MockServer::start().await;
    let workbook = vec![0x50, 0x4b, 0x03, 0x04, 0x00];

    Mock::given(method("GET"))
        .and(path("/subject/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(workbook.clone()))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    assert_eq!(client.subjects().export().await.unwrap(), workbook);
}

#[tokio::test]
async fn test_download_template() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/student/download-template"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK-template".to_vec()))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    assert_eq!(client.students().download_template().await.unwrap(), b"PK-template");
}

#[tokio::test]
async fn test_upload_summary() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/student/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "Upload processed",
            "summary": {"totalRowsInFile": 2},
            "newlyCreated": [{"student_id": 10, "studentname_en": "Sokha", "studentname_kh": "សុខា"}],
            "errors": [{"row": 3, "message": "Duplicate", "data": {}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let summary = client
        .students()
        .upload("roster.xlsx", b"PK".to_vec())
        .await
        .unwrap();

    assert!(summary.success);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.success_count(), 1);
    assert_eq!(summary.failed[0].error, "Duplicate");

    let received = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"students\""));
    assert!(body.contains("filename=\"roster.xlsx\""));
}

#[tokio::test]
async fn test_delete_all_students() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/student/delete-all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "All students deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let message = client.students().delete_all().await.unwrap();
    assert_eq!(message.as_deref(), Some("All students deleted"));
}

// =============================================================================
// ATTENDANCE
// =============================================================================

#[tokio::test]
async fn test_weekly_grid_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/attendance/weekly-grid"))
        .and(query_param("classId", "3"))
        .and(query_param("startDate", "2026-10-11"))
        .and(query_param("endDate", "2026-10-17"))
        .respond_with(ok(serde_json::json!({
            "students": [{
                "student_id": 1,
                "student_name_kh": "សុខា",
                "student_name_eng": "Sokha",
                "gender": "F",
                "attendance_rate": 95,
                "daily_attendance": {"2026-10-12": [{"status": "present"}]}
            }]
        })))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let grid = client
        .attendance()
        .weekly_grid(ClassId(3), day(11), day(17))
        .await
        .unwrap();

    assert_eq!(grid.len(), 1);
    let sokha = grid.student(StudentId(1)).unwrap();
    assert_eq!(sokha.attendance_rate.as_deref(), Some("95"));
    assert_eq!(sokha.server_status(day(12)), Some(AttendanceStatus::Present));
}

#[tokio::test]
async fn test_list_attendance_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/attendance/getall"))
        .respond_with(ok(serde_json::json!([{
            "attendance_id": 5,
            "student_id": 1,
            "subject_id": 2,
            "attendance_date": "2026-10-12T00:00:00.000Z",
            "status": "Late"
        }])))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let records = client.attendance().list().await.unwrap();
    assert_eq!(records[0].attendance_id, Some(5));
    assert_eq!(records[0].status, AttendanceStatus::Late);
}

#[tokio::test]
async fn test_submit_all_sends_one_write_each() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/attendance/create"))
        .respond_with(ok(serde_json::json!({})))
        .expect(3)
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let writes = vec![
        write(1, AttendanceStatus::Present),
        write(2, AttendanceStatus::Absent),
        write(3, AttendanceStatus::Late),
    ];
    assert_eq!(client.attendance().submit_all(writes).await.unwrap(), 3);
}

#[tokio::test]
async fn test_submit_all_reports_one_aggregate_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/attendance/create"))
        .and(body_partial_json(serde_json::json!({"student_id": 2})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/attendance/create"))
        .respond_with(ok(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let writes = vec![
        write(1, AttendanceStatus::Present),
        write(2, AttendanceStatus::Absent),
        write(3, AttendanceStatus::Present),
    ];

    match client.attendance().submit_all(writes).await {
        Err(Error::Server(msg)) => assert_eq!(msg, COMMIT_FAILED),
        other => panic!("expected aggregate failure, got {:?}", other),
    }
    // Every write was still attempted.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_submit_nothing() {
    let client = SchoolClient::new("http://127.0.0.1:1");
    assert_eq!(client.attendance().submit_all(Vec::new()).await.unwrap(), 0);
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
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
    Mock::given(method("GET"))
        .and(path("/dashboard/attendance-stats"))
        .respond_with(ok(serde_json::json!({"present": 80, "absent": 20})))
        .mount(&server)
        .await;

    let client = SchoolClient::new(server.uri());
    let stats = client.dashboard().stats().await.unwrap();
    assert_eq!(stats.total_students, 120);
    assert_eq!(stats.total_teachers, 9);

    let breakdown = client.dashboard().attendance_stats().await.unwrap();
    assert_eq!(breakdown["present"], 80);
}
