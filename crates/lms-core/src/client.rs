//! Remote API surface and its blocking HTTP implementation.
//!
//! [`LmsApi`] is the seam every procedure is written against. [`HttpClient`]
//! talks to a Canvas-style `/api/v1` endpoint with bearer authentication and
//! follows `Link: <…>; rel="next"` pagination lazily, one page at a time.

use crate::config::Config;
use crate::error::{LmsError, Result};
use crate::types::{
    CommunicationChannel, Course, Enrollment, EnrollmentRequest, Group, Section, User,
};
use regex::Regex;
use reqwest::blocking::{RequestBuilder, Response};
use reqwest::header::LINK;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::OnceLock;

const PER_PAGE: &str = "100";
const MAX_ERROR_BODY: usize = 500;

/// A lazily paginated listing. Yields at most one `Err`, after which the
/// listing ends.
pub type Records<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

// ---------------------------------------------------------------------------
// LmsApi
// ---------------------------------------------------------------------------

pub trait LmsApi {
    /// Enrollments of a user addressed by SIS id, filtered to `state`.
    fn list_user_enrollments(&self, sis_user_id: &str, state: &str) -> Records<'_, Enrollment>;

    fn get_section(&self, section_id: u64) -> Result<Section>;

    /// Mutating: create (or re-activate) an enrollment in a section.
    fn enroll_in_section(&self, section_id: u64, request: &EnrollmentRequest) -> Result<()>;

    fn get_user_by_sis_id(&self, sis_user_id: &str) -> Result<User>;

    fn list_communication_channels(&self, user_id: u64) -> Records<'_, CommunicationChannel>;

    fn list_user_courses(&self, user_id: u64) -> Records<'_, Course>;

    fn list_course_groups(&self, course_id: u64) -> Records<'_, Group>;

    fn list_group_users(&self, group_id: u64) -> Records<'_, User>;

    fn list_course_sections(&self, course_id: u64) -> Records<'_, Section>;

    /// Mutating: set a course's name and course code.
    fn update_course(&self, course_id: u64, name: &str, course_code: &str) -> Result<()>;

    /// Mutating: rename a section.
    fn update_section(&self, section_id: u64, name: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

pub struct HttpClient {
    config: Config,
    http: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("lms-fix/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    fn send(&self, url: &str, req: RequestBuilder) -> Result<Response> {
        tracing::debug!(url, "api request");
        let resp = req.bearer_auth(&self.config.api_key).send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let mut body = resp.text().unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(LmsError::RemoteRejected {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        })
    }

    fn decode<T: DeserializeOwned>(url: &str, resp: Response) -> Result<T> {
        let text = resp.text()?;
        serde_json::from_str(&text).map_err(|e| LmsError::MalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.api_url(path);
        let resp = self.send(&url, self.http.get(&url))?;
        Self::decode(&url, resp)
    }

    fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        let url = self.config.api_url(path);
        self.send(&url, self.http.put(&url).json(body))?;
        Ok(())
    }

    fn fetch_page<T: DeserializeOwned>(&self, page: PageRequest) -> Result<(Vec<T>, Option<String>)> {
        let (url, req) = match page {
            PageRequest::First { url, query } => {
                let req = self.http.get(&url).query(&query);
                (url, req)
            }
            PageRequest::Next(url) => {
                let req = self.http.get(&url);
                (url, req)
            }
        };
        let resp = self.send(&url, req)?;
        let next = resp
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(next_link);
        let items = Self::decode(&url, resp)?;
        Ok((items, next))
    }

    fn paginate<T: DeserializeOwned + 'static>(
        &self,
        path: &str,
        mut query: Vec<(String, String)>,
    ) -> Records<'_, T> {
        query.push(("per_page".to_string(), PER_PAGE.to_string()));
        Box::new(Pages {
            client: self,
            next: Some(PageRequest::First {
                url: self.config.api_url(path),
                query,
            }),
            buffer: VecDeque::new(),
        })
    }
}

impl LmsApi for HttpClient {
    fn list_user_enrollments(&self, sis_user_id: &str, state: &str) -> Records<'_, Enrollment> {
        self.paginate(
            &format!("users/{}/enrollments", sis_user_segment(sis_user_id)),
            vec![("state[]".to_string(), state.to_string())],
        )
    }

    fn get_section(&self, section_id: u64) -> Result<Section> {
        self.get_json(&format!("sections/{section_id}"))
    }

    fn enroll_in_section(&self, section_id: u64, request: &EnrollmentRequest) -> Result<()> {
        let url = self.config.api_url(&format!("sections/{section_id}/enrollments"));
        let body = json!({ "enrollment": request });
        self.send(&url, self.http.post(&url).json(&body))?;
        Ok(())
    }

    fn get_user_by_sis_id(&self, sis_user_id: &str) -> Result<User> {
        self.get_json(&format!("users/{}", sis_user_segment(sis_user_id)))
    }

    fn list_communication_channels(&self, user_id: u64) -> Records<'_, CommunicationChannel> {
        self.paginate(&format!("users/{user_id}/communication_channels"), vec![])
    }

    fn list_user_courses(&self, user_id: u64) -> Records<'_, Course> {
        self.paginate(&format!("users/{user_id}/courses"), vec![])
    }

    fn list_course_groups(&self, course_id: u64) -> Records<'_, Group> {
        self.paginate(&format!("courses/{course_id}/groups"), vec![])
    }

    fn list_group_users(&self, group_id: u64) -> Records<'_, User> {
        self.paginate(&format!("groups/{group_id}/users"), vec![])
    }

    fn list_course_sections(&self, course_id: u64) -> Records<'_, Section> {
        self.paginate(&format!("courses/{course_id}/sections"), vec![])
    }

    fn update_course(&self, course_id: u64, name: &str, course_code: &str) -> Result<()> {
        self.put_json(
            &format!("courses/{course_id}"),
            &json!({ "course": { "name": name, "course_code": course_code } }),
        )
    }

    fn update_section(&self, section_id: u64, name: &str) -> Result<()> {
        self.put_json(
            &format!("sections/{section_id}"),
            &json!({ "course_section": { "name": name } }),
        )
    }
}

/// `sis_user_id:{id}` as one percent-encoded path segment, so an id holding
/// `/`, `?` or `#` cannot address a different endpoint.
fn sis_user_segment(sis_user_id: &str) -> String {
    let mut url = Url::parse("http://segment.invalid/").expect("static URL parses");
    url.path_segments_mut()
        .expect("http URL has a path")
        .push(&format!("sis_user_id:{sis_user_id}"));
    url.path().trim_start_matches('/').to_string()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

enum PageRequest {
    First {
        url: String,
        query: Vec<(String, String)>,
    },
    Next(String),
}

struct Pages<'a, T> {
    client: &'a HttpClient,
    next: Option<PageRequest>,
    buffer: VecDeque<T>,
}

impl<T: DeserializeOwned> Iterator for Pages<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }
            let page = self.next.take()?;
            match self.client.fetch_page(page) {
                Ok((items, next)) => {
                    self.buffer.extend(items);
                    self.next = next.map(PageRequest::Next);
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

static NEXT_LINK_RE: OnceLock<Regex> = OnceLock::new();

fn next_link_re() -> &'static Regex {
    NEXT_LINK_RE.get_or_init(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).unwrap())
}

/// Extract the `rel="next"` target from a `Link` header value.
fn next_link(header: &str) -> Option<String> {
    next_link_re()
        .captures(header)
        .map(|c| c[1].to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn client_for(server: &Server) -> HttpClient {
        HttpClient::new(Config {
            base_url: server.url(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn enrollment(id: u64) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": 77,
            "course_id": 310,
            "course_section_id": 412,
            "sis_section_id": "S1",
            "type": "StudentEnrollment",
            "enrollment_state": "deleted",
            "updated_at": "2024-08-25T00:00:00Z"
        })
    }

    #[test]
    fn next_link_picks_the_next_relation() {
        let header = r#"<https://lms.test/api/v1/x?page=1>; rel="current",<https://lms.test/api/v1/x?page=2>; rel="next",<https://lms.test/api/v1/x?page=9>; rel="last""#;
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://lms.test/api/v1/x?page=2")
        );
        assert_eq!(next_link(r#"<https://lms.test/x>; rel="last""#), None);
    }

    #[test]
    fn enrollments_follow_pagination_links() {
        let mut server = Server::new();
        let page_two = format!("{}/api/v1/users/sis_user_id:42/enrollments?page=2", server.url());
        let first = server
            .mock("GET", "/api/v1/users/sis_user_id:42/enrollments")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state[]".into(), "deleted".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .match_header("authorization", "Bearer test-key")
            .with_header("content-type", "application/json")
            .with_header("link", &format!("<{page_two}>; rel=\"next\""))
            .with_body(json!([enrollment(1), enrollment(2)]).to_string())
            .create();
        let second = server
            .mock("GET", "/api/v1/users/sis_user_id:42/enrollments")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_header("content-type", "application/json")
            .with_body(json!([enrollment(3)]).to_string())
            .create();

        let client = client_for(&server);
        let ids: Vec<u64> = client
            .list_user_enrollments("42", "deleted")
            .map(|r| r.unwrap().id)
            .collect();

        assert_eq!(ids, vec![1, 2, 3]);
        first.assert();
        second.assert();
    }

    #[test]
    fn listing_ends_after_a_rejected_page() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/users/sis_user_id:42/enrollments")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create();

        let client = client_for(&server);
        let results: Vec<_> = client.list_user_enrollments("42", "deleted").collect();
        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(LmsError::RemoteRejected { status, body, .. }) => {
                assert_eq!(*status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn undecodable_record_is_malformed_response() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/users/sis_user_id:42/enrollments")
            .match_query(Matcher::Any)
            .with_body(json!([{ "id": 1 }]).to_string())
            .create();

        let client = client_for(&server);
        let first = client.list_user_enrollments("42", "deleted").next().unwrap();
        assert!(matches!(first, Err(LmsError::MalformedResponse { .. })));
    }

    #[test]
    fn unreachable_host_is_remote_unavailable() {
        let client = HttpClient::new(Config {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "k".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        let err = client.get_section(1).unwrap_err();
        assert!(matches!(err, LmsError::RemoteUnavailable(_)));
    }

    #[test]
    fn enroll_posts_nested_enrollment_body() {
        let mut server = Server::new();
        let m = server
            .mock("POST", "/api/v1/sections/412/enrollments")
            .match_body(Matcher::Json(json!({
                "enrollment": {
                    "user_id": "77",
                    "type": "TeacherEnrollment",
                    "enrollment_state": "active"
                }
            })))
            .with_body("{}")
            .expect(1)
            .create();

        let client = client_for(&server);
        let req = EnrollmentRequest {
            user_id: "77".to_string(),
            enrollment_type: "TeacherEnrollment".to_string(),
            enrollment_state: "active".to_string(),
            start_at: None,
            end_at: None,
        };
        client.enroll_in_section(412, &req).unwrap();
        m.assert();
    }

    #[test]
    fn update_course_and_section_send_put_bodies() {
        let mut server = Server::new();
        let course = server
            .mock("PUT", "/api/v1/courses/5")
            .match_body(Matcher::Json(json!({
                "course": { "name": "HBEHEQ 101", "course_code": "HBEHEQ-101" }
            })))
            .with_body("{}")
            .create();
        let section = server
            .mock("PUT", "/api/v1/sections/6")
            .match_body(Matcher::Json(json!({ "course_section": { "name": "HBEHEQ 101 001" } })))
            .with_body("{}")
            .create();

        let client = client_for(&server);
        client.update_course(5, "HBEHEQ 101", "HBEHEQ-101").unwrap();
        client.update_section(6, "HBEHEQ 101 001").unwrap();
        course.assert();
        section.assert();
    }

    #[test]
    fn sis_user_segment_escapes_path_delimiters() {
        assert_eq!(sis_user_segment("42"), "sis_user_id:42");
        assert_eq!(sis_user_segment("a/b"), "sis_user_id:a%2Fb");
        assert_eq!(
            sis_user_segment("99/enrollments#"),
            "sis_user_id:99%2Fenrollments%23"
        );
        assert_eq!(sis_user_segment("x?y"), "sis_user_id:x%3Fy");
    }

    #[test]
    fn sis_id_with_slash_stays_in_one_segment() {
        let mut server = Server::new();
        let wrong = server
            .mock("GET", "/api/v1/users/sis_user_id:a/b/enrollments")
            .match_query(Matcher::Any)
            .with_body("[]")
            .expect(0)
            .create();
        let right = server
            .mock("GET", "/api/v1/users/sis_user_id:a%2Fb/enrollments")
            .match_query(Matcher::Any)
            .with_body(json!([enrollment(1)]).to_string())
            .expect(1)
            .create();

        let client = client_for(&server);
        let ids: Vec<u64> = client
            .list_user_enrollments("a/b", "deleted")
            .map(|r| r.unwrap().id)
            .collect();

        assert_eq!(ids, vec![1]);
        wrong.assert();
        right.assert();
    }

    #[test]
    fn get_user_by_sis_id_addresses_sis_namespace() {
        let mut server = Server::new();
        server
            .mock("GET", "/api/v1/users/sis_user_id:abc123")
            .with_body(json!({ "id": 77, "name": "Pat Doe" }).to_string())
            .create();

        let client = client_for(&server);
        let user = client.get_user_by_sis_id("abc123").unwrap();
        assert_eq!(user.id, 77);
        assert_eq!(user.name, "Pat Doe");
    }
}
