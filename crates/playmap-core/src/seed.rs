//! Built-in seed project used when no persisted state is usable.

use crate::file::FileTable;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>Playmap</title>
    <link rel="stylesheet" href="style.css" />
  </head>
  <body>
    <h1 id="greeting">Hello</h1>
    <script type="module" src="main.js"></script>
  </body>
</html>
"#;

const STYLE_CSS: &str = r#"body {
  font-family: system-ui, sans-serif;
  margin: 2rem;
}
"#;

const MAIN_JS: &str = r#"import { greet } from "greet.js";

document.getElementById("greeting").textContent = greet("playmap");
console.log("ready");
"#;

const GREET_JS: &str = r#"export function greet(name) {
  return `Hello, ${name}!`;
}
"#;

/// The seed project: an entry document, a style sheet and two modules.
pub fn seed_project() -> FileTable {
    let mut files = FileTable::new();
    files.create("seed-1", "index.html", INDEX_HTML);
    files.create("seed-2", "style.css", STYLE_CSS);
    files.create("seed-3", "main.js", MAIN_JS);
    files.create("seed-4", "greet.js", GREET_JS);
    files
}
