//! Image list parsing and validation.
//!
//! Turns operator-supplied free text into structured descriptors with zero
//! network access. One descriptor per non-empty, non-comment line; invalid
//! references are flagged, not dropped, so the operator sees every line they
//! typed reflected back.

mod descriptor;

pub use descriptor::{ImageDescriptor, ImageWarning};

use regex::Regex;
use std::sync::LazyLock;

/// Registries accepted without a tagged reference shape. A name whose host
/// is listed here is valid even when it matches none of the shape patterns.
const KNOWN_REGISTRIES: &[&str] = &[
    "docker.io",
    "registry-1.docker.io",
    "ghcr.io",
    "gcr.io",
    "registry.k8s.io",
    "k8s.gcr.io",
    "quay.io",
    "mcr.microsoft.com",
    "public.ecr.aws",
];

/// Repository path: lowercase segments separated by `/`.
static REPOSITORY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*(?:/[a-z0-9]+(?:[._-][a-z0-9]+)*)*$").unwrap()
});

/// Tag: word character start, then up to 127 tag characters.
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]{0,127}$").unwrap());

/// Registry host: `localhost`, a dotted domain, or host:port.
static REGISTRY_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:localhost(?::[0-9]+)?|[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)+(?::[0-9]+)?|[a-zA-Z0-9-]+:[0-9]+)$",
    )
    .unwrap()
});

/// Parses a free-text image list into descriptors.
///
/// Lines that are empty after trimming or start with `#` produce no
/// descriptor. Input order is preserved via [`ImageDescriptor::index`]; no
/// deduplication is performed.
#[must_use]
pub fn parse_image_list(input: &str) -> Vec<ImageDescriptor> {
    let mut descriptors = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let index = descriptors.len();
        descriptors.push(parse_line(line, index));
    }

    descriptors
}

fn parse_line(line: &str, index: usize) -> ImageDescriptor {
    let (name, platform_hint) = split_platform(line);
    let (repository, explicit_tag) = split_tag(&name);
    let (host, path) = split_registry(repository);

    let is_valid = classify(host, path, explicit_tag);

    let mut warnings = Vec::new();
    match explicit_tag {
        None => warnings.push(ImageWarning::NoTag),
        Some("latest") => warnings.push(ImageWarning::LatestTag),
        Some(_) => {}
    }
    if let Some(hint) = &platform_hint {
        if !hint.starts_with("linux/") {
            warnings.push(ImageWarning::NonLinuxPlatform { hint: hint.clone() });
        }
    }

    ImageDescriptor {
        original: line.to_string(),
        tag: explicit_tag.unwrap_or("latest").to_string(),
        registry_host: host.unwrap_or("docker.io").to_string(),
        name,
        platform_hint,
        is_valid,
        warnings,
        index,
    }
}

/// Extracts a `--platform <value>` or `--platform=<value>` token from
/// anywhere in the line; the remaining tokens form the image name.
fn split_platform(line: &str) -> (String, Option<String>) {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut hint = None;

    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if let Some(value) = token.strip_prefix("--platform=") {
            hint = Some(value.to_string());
        } else if token == "--platform" {
            if let Some(value) = tokens.next() {
                hint = Some(value.to_string());
            }
        } else {
            name_parts.push(token);
        }
    }

    (name_parts.join(" "), hint)
}

/// Splits the tag off the reference. The segment after the last `:` is a
/// tag only when it contains no `/`; otherwise the colon belonged to a
/// registry port.
fn split_tag(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once(':') {
        Some((repository, tag)) if !tag.is_empty() && !tag.contains('/') => {
            (repository, Some(tag))
        }
        _ => (name, None),
    }
}

/// Splits the registry host off the repository. The first `/`-delimited
/// segment counts as a host when it contains a `.` or `:`.
fn split_registry(repository: &str) -> (Option<&str>, &str) {
    match repository.split_once('/') {
        Some((first, rest)) if first.contains('.') || first.contains(':') => (Some(first), rest),
        Some(_) => (None, repository),
        None if repository.contains('.') || repository.contains(':') => (Some(repository), ""),
        None => (None, repository),
    }
}

/// Applies the acceptable-shape rules: fully qualified `registry/path:tag`,
/// bare `path:tag`, bare `path`, or a known-registry host.
fn classify(host: Option<&str>, path: &str, tag: Option<&str>) -> bool {
    let path_ok = REPOSITORY_PATH.is_match(path);

    match (host, tag) {
        (Some(host), Some(tag)) => {
            (REGISTRY_HOST.is_match(host) || KNOWN_REGISTRIES.contains(&host))
                && path_ok
                && TAG.is_match(tag)
        }
        (Some(host), None) => KNOWN_REGISTRIES.contains(&host) && path_ok,
        (None, Some(tag)) => path_ok && TAG.is_match(tag),
        (None, None) => path_ok,
    }
}
