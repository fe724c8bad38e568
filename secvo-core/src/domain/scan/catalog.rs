use secvo_model::{NewVulnerability, Severity};

/// One entry of the fixed demo finding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub recommendation: &'static str,
}

impl CatalogEntry {
    pub fn to_new_vulnerability(&self) -> NewVulnerability {
        NewVulnerability {
            name: self.name.to_string(),
            description: self.description.to_string(),
            severity: self.severity,
            recommendation: self.recommendation.to_string(),
        }
    }
}

pub const FINDING_CATALOG: [CatalogEntry; 6] = [
    CatalogEntry {
        name: "Outdated Web Server",
        description: "The web server is running an outdated version with known vulnerabilities.",
        severity: Severity::High,
        recommendation: "Update to the latest version to patch security issues.",
    },
    CatalogEntry {
        name: "Missing HTTPS",
        description: "The website does not use HTTPS, exposing data transmitted between the server and clients.",
        severity: Severity::Medium,
        recommendation: "Implement SSL/TLS to encrypt data transmission and protect user privacy.",
    },
    CatalogEntry {
        name: "Open Ports",
        description: "Several unnecessary ports are open on your server, increasing the attack surface.",
        severity: Severity::Medium,
        recommendation: "Close ports 21, 8080, and 3306 if not required for normal operation.",
    },
    CatalogEntry {
        name: "Cross-Site Scripting (XSS) Vulnerability",
        description: "Input validation issues could allow attackers to inject malicious scripts.",
        severity: Severity::High,
        recommendation: "Implement proper input validation and output encoding.",
    },
    CatalogEntry {
        name: "Weak Content Security Policy",
        description: "The site lacks proper Content Security Policy headers.",
        severity: Severity::Low,
        recommendation: "Implement strong CSP headers to prevent XSS and data injection attacks.",
    },
    CatalogEntry {
        name: "Cookie Without Secure Flag",
        description: "Cookies are set without the secure flag, which could expose them to theft over HTTP.",
        severity: Severity::Low,
        recommendation: "Set the Secure flag on all cookies to ensure they are only sent over HTTPS.",
    },
];
