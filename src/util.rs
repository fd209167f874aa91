//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// First `max` characters of `s`, never splitting a UTF-8 sequence.
/// Used for the `details` field of error responses and for log previews.
pub fn preview(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", preview(s, max), s.len())
  }
}

/// Strip a Markdown code fence the model sometimes wraps JSON in:
/// a leading "```json" or "```" and a trailing "```".
pub fn strip_code_fence(text: &str) -> &str {
  let mut s = text.trim();
  if let Some(rest) = s.strip_prefix("```json") {
    s = rest;
  }
  if let Some(rest) = s.strip_prefix("```") {
    s = rest;
  }
  if let Some(rest) = s.strip_suffix("```") {
    s = rest;
  }
  s.trim()
}

/// True when `haystack` contains any of `needles` (case-insensitive, Unicode aware).
pub fn contains_any_ci(haystack: &str, needles: &[&str]) -> bool {
  let lower = haystack.to_lowercase();
  needles.iter().any(|n| lower.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} și {b}, apoi {a}", &[("a", "Olt"), ("b", "Mureș")]);
    assert_eq!(out, "Olt și Mureș, apoi Olt");
  }

  #[test]
  fn preview_respects_char_boundaries() {
    assert_eq!(preview("Bărăgan", 3), "Băr");
    assert_eq!(preview("ab", 10), "ab");
  }

  #[test]
  fn trunc_for_log_marks_truncation() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert!(trunc_for_log("abcdefghij", 4).starts_with("abcd…"));
  }

  #[test]
  fn strip_code_fence_handles_json_and_plain_fences() {
    assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
    assert_eq!(strip_code_fence("  ```\n[2]```  "), "[2]");
    assert_eq!(strip_code_fence("[3]"), "[3]");
  }

  #[test]
  fn contains_any_ci_ignores_case() {
    assert!(contains_any_ci("De CE este așa?", &["de ce"]));
    assert!(contains_any_ci("EXPLICĂ te rog", &["explică"]));
    assert!(!contains_any_ci("salut", &["unde", "cum"]));
  }
}
