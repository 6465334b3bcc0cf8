use once_cell::sync::Lazy;
use packline_common::{DependencyKind, FileClass};
use regex::Regex;

// The pipeline is not a language compiler. It only needs to locate
// import/reference statements, so plain pattern matching is enough.

static STATIC_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(?m)^\s*(?:import|export)\s+[^("';\n]*?["']([^"']+)["']"#).unwrap()
});
static REQUIRE_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"require\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap());
static DYNAMIC_IMPORT_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"import\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap());
static CSS_IMPORT_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"@import\s+(?:url\s*\(\s*)?["']([^"']+)["']\s*\)?"#).unwrap());
static CSS_URL_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r#"url\s*\(\s*["']?([^"'()\s]+)["']?\s*\)"#).unwrap());

/// Only path specifiers participate in the graph. Remote references and bare
/// package names are outside this pipeline's scope.
fn is_path_specifier(specifier: &str) -> bool {
  specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// Extracts dependency specifiers from transformed text content, in authored
/// order, deduplicated on first occurrence.
pub(crate) fn scan_specifiers(source: &str, class: FileClass) -> Vec<(String, DependencyKind)> {
  let mut found: Vec<(usize, String, DependencyKind)> = vec![];

  let mut collect = |re: &Regex, kind: DependencyKind| {
    for caps in re.captures_iter(source) {
      let m = caps.get(1).unwrap();
      if is_path_specifier(m.as_str()) {
        found.push((m.start(), m.as_str().to_string(), kind));
      }
    }
  };

  match class {
    FileClass::Script | FileClass::Markup => {
      collect(&STATIC_IMPORT_RE, DependencyKind::Static);
      collect(&REQUIRE_RE, DependencyKind::Static);
      collect(&DYNAMIC_IMPORT_RE, DependencyKind::DynamicAsync);
    }
    FileClass::Style => {
      collect(&CSS_IMPORT_RE, DependencyKind::Static);
      collect(&CSS_URL_RE, DependencyKind::Static);
    }
    FileClass::Binary => {}
  }

  found.sort_by_key(|(pos, ..)| *pos);

  let mut specifiers: Vec<(String, DependencyKind)> = vec![];
  for (_, specifier, kind) in found {
    if !specifiers.iter().any(|(existing, _)| existing == &specifier) {
      specifiers.push((specifier, kind));
    }
  }
  specifiers
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scans_script_imports_in_author_order() {
    let source = r#"
import { a } from './a';
import './side-effect';
const b = require('./b');
const lazy = import('./lazy');
import remote from 'https://cdn.example/x.js';
import bare from 'react';
"#;
    let specifiers = scan_specifiers(source, FileClass::Script);
    assert_eq!(
      specifiers,
      vec![
        ("./a".to_string(), DependencyKind::Static),
        ("./side-effect".to_string(), DependencyKind::Static),
        ("./b".to_string(), DependencyKind::Static),
        ("./lazy".to_string(), DependencyKind::DynamicAsync),
      ]
    );
  }

  #[test]
  fn scans_style_references() {
    let source = r#"
@import './reset.css';
.logo { background: url("./logo.png"); }
.remote { background: url(data:image/png;base64,xyz); }
"#;
    let specifiers = scan_specifiers(source, FileClass::Style);
    assert_eq!(
      specifiers,
      vec![
        ("./reset.css".to_string(), DependencyKind::Static),
        ("./logo.png".to_string(), DependencyKind::Static),
      ]
    );
  }

  #[test]
  fn duplicate_specifiers_are_deduplicated() {
    let source = "import { a } from './a';\nimport { b } from './a';\n";
    let specifiers = scan_specifiers(source, FileClass::Script);
    assert_eq!(specifiers.len(), 1);
  }
}
