// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for submission simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A consultation request that passes every check.
pub fn consultation(name: &str) -> Value {
    json!({
        "data": {
            "name": name,
            "email": "ada@example.com",
            "company": "Analytical Engines",
            "phone": "+44 20 7946 0958",
            "service": "data-analytics",
            "message": "We would like a dashboard for our sales data."
        }
    })
}

/// A job application with a resume that passes every check.
pub fn job_application() -> Value {
    json!({
        "data": {
            "fullName": "Grace Hopper",
            "email": "Grace@Example.com",
            "position": "developer",
            "experience": "10+ years",
            "linkedin": "https://www.linkedin.com/in/grace",
            "coverLetter": "I write compilers.",
            "resume": {
                "name": "grace-hopper.pdf",
                "contentType": "application/pdf",
                "size": 120_000
            }
        }
    })
}

/// Consultation request with one field replaced.
pub fn consultation_with(field: &str, value: Value) -> Value {
    let mut body = consultation("Ada Lovelace");
    body["data"][field] = value;
    body
}

/// Job application with one field replaced.
pub fn job_application_with(field: &str, value: Value) -> Value {
    let mut body = job_application();
    body["data"][field] = value;
    body
}

/// Markup injection attempts for free-text fields.
pub fn generate_xss_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "\"><svg onload=alert(1)>",
        "'; DROP TABLE users; --",
        "<a href=\"javascript:alert(1)\">click</a>",
    ]
}

/// Email addresses that must be rejected.
pub fn generate_malformed_emails() -> Vec<&'static str> {
    vec![
        "plainaddress",
        "@missing-local.com",
        "missing-at.example.com",
        "two@@example.com",
        "user@localhost",
        "user@example.c",
        "user name@example.com",
    ]
}

/// Malformed URL variations for testing.
/// These URLs should be rejected by the validator for various reasons:
/// - Empty/whitespace: missing URL
/// - not-a-url: parse failure
/// - ftp/file/javascript/data: invalid scheme (only http/https allowed)
/// - https://: empty host parse failure
/// - ://missing-scheme.com/: parse failure
pub fn generate_malformed_urls() -> Vec<&'static str> {
    vec![
        "",
        "   ",
        "not-a-url",
        "ftp://wrong-scheme.com/",
        "://missing-scheme.com/",
        "https://",
        "javascript:alert(1)",
        "data:text/html,<script>",
        "file:///etc/passwd",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_field_override() {
        let body = consultation_with("service", json!("astrology"));
        assert_eq!(body["data"]["service"], "astrology");
        assert_eq!(body["data"]["name"], "Ada Lovelace");
    }
}
