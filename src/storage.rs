use crate::constants::PROJECT_FILE;
use crate::models::{ApiResponse, HttpRequest, Project, Variables};
use crate::viewer::pretty;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A directory holding a `project.json`
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectEntry {
    pub dir: PathBuf,
    pub name: String,
}

impl ProjectEntry {
    /// Menu label, `dir - name`
    pub fn label(&self) -> String {
        let dir = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dir.display().to_string());
        format!("{} - {}", dir, self.name)
    }
}

/// Find project directories directly under `root`, sorted by path
pub fn discover_projects(root: &Path) -> Result<Vec<ProjectEntry>> {
    let mut projects = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("reading {}", root.display()))? {
        let path = entry?.path();
        let project_file = path.join(PROJECT_FILE);
        if !path.is_dir() || !project_file.exists() {
            continue;
        }
        let name = fs::read_to_string(&project_file)
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .and_then(|value| value.get("name").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();
        projects.push(ProjectEntry { dir: path, name });
    }
    projects.sort_by(|a, b| a.dir.cmp(&b.dir));
    Ok(projects)
}

/// Strip scheme, `www.` and a leading slash, then make the rest path-safe
pub fn sanitize_for_filename(input: &str) -> String {
    let mut input = input;
    for prefix in ["https://", "http://", "wss://", "www.", "/"] {
        input = input.strip_prefix(prefix).unwrap_or(input);
    }
    input.replace('/', "-").replace('+', "").replace('?', "-")
}

/// Objects merge recursively, `overlay` wins everywhere else
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// A loaded project plus everything needed to persist results
pub struct ProjectStore {
    pub project: Project,
    dir: PathBuf,
    /// The project file exactly as written, without base project content
    raw: Value,
}

impl ProjectStore {
    pub fn load(dir: &Path) -> Result<Self> {
        let dir = dir.to_path_buf();
        let raw = read_json(&dir.join(PROJECT_FILE))?;

        let mut merged = raw.clone();
        if let Some(base) = raw.get("base_project").and_then(Value::as_str) {
            let base_dir = dir.join(base);
            let base_file = base_dir.join(PROJECT_FILE);
            if base_file.exists() {
                let base_raw = read_json(&base_file)?;
                merged = merge_values(base_raw, raw.clone());
                tracing::info!(base = %base_dir.display(), "Merged base project");
            } else {
                tracing::warn!(base = %base_dir.display(), "Base project not found");
            }
        }

        let project: Project = serde_json::from_value(merged)
            .with_context(|| format!("invalid {} in {}", PROJECT_FILE, dir.display()))?;
        tracing::info!(
            name = %project.name,
            requests = project.requests.len(),
            "Loaded project"
        );

        Ok(ProjectStore { project, dir, raw })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir
            .join(self.project.variables.substitute(&self.project.output_path))
    }

    /// Write `{request, response}` and the raw body. Returns the exchange file path.
    pub fn save_exchange(&self, request: &HttpRequest, response: &ApiResponse) -> Result<PathBuf> {
        let bucket_dir = self.output_dir().join(&request.bucket_label);
        let raw_dir = bucket_dir.join("raw");
        fs::create_dir_all(&raw_dir)
            .with_context(|| format!("creating {}", raw_dir.display()))?;

        let timestamp = request
            .timestamp
            .map(|t| t.format("%Y-%m-%dT%H-%M-%S").to_string())
            .unwrap_or_default();
        let filename = sanitize_for_filename(&format!(
            "{} {}",
            timestamp,
            request.summary().replacen('/', "", 1)
        ));

        let mut exchange = Map::new();
        exchange.insert("request".into(), request.to_json());
        exchange.insert("response".into(), response.to_json());
        let path = bucket_dir.join(format!("{}.json", filename));
        fs::write(&path, serde_json::to_string(&Value::Object(exchange))?)
            .with_context(|| format!("writing {}", path.display()))?;

        let raw_path = raw_dir.join(format!("{}.txt", filename));
        fs::write(&raw_path, pretty(&response.to_json()["body"]))
            .with_context(|| format!("writing {}", raw_path.display()))?;

        tracing::debug!(path = %path.display(), "Saved exchange");
        Ok(path)
    }

    /// Rewrite the project file with new variable values
    pub fn save_variables(&mut self, vars: &Variables) -> Result<()> {
        self.project.variables = vars.clone();
        if let Value::Object(raw) = &mut self.raw {
            raw.insert("variables".into(), serde_json::to_value(vars)?);
        }
        let path = self.dir.join(PROJECT_FILE);
        fs::write(&path, pretty(&self.raw)).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, Request};
    use serde_json::json;
    use tempfile::tempdir;

    fn write_project(dir: &Path, value: Value) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(PROJECT_FILE), value.to_string()).unwrap();
    }

    #[test]
    fn test_sanitize_for_filename() {
        assert_eq!(sanitize_for_filename("https://www.api.io/v1/x?y"), "api.io-v1-x-y");
        assert_eq!(sanitize_for_filename("/a+b/c"), "ab-c");
        assert_eq!(sanitize_for_filename("wss://host"), "host");
    }

    #[test]
    fn test_merge_values() {
        let base = json!({"a": {"x": 1, "y": 2}, "b": [1], "c": "base"});
        let child = json!({"a": {"y": 3}, "b": [2]});
        assert_eq!(
            merge_values(base, child),
            json!({"a": {"x": 1, "y": 3}, "b": [2], "c": "base"})
        );
    }

    #[test]
    fn test_discover_projects() {
        let root = tempdir().unwrap();
        write_project(&root.path().join("beta"), json!({"name": "Beta"}));
        write_project(&root.path().join("alpha"), json!({"name": "Alpha"}));
        fs::create_dir_all(root.path().join("empty")).unwrap();

        let projects = discover_projects(root.path()).unwrap();
        let labels: Vec<String> = projects.iter().map(ProjectEntry::label).collect();
        assert_eq!(labels, vec!["alpha - Alpha", "beta - Beta"]);
    }

    #[test]
    fn test_load_merges_base_project() {
        let root = tempdir().unwrap();
        write_project(
            &root.path().join("base"),
            json!({
                "api_base": "https://example.com",
                "variables": {"token": "t", "id": "1"},
                "requests": [{"endpoint": "/items"}]
            }),
        );
        write_project(
            &root.path().join("child"),
            json!({"name": "Child", "base_project": "../base", "variables": {"id": "2"}}),
        );

        let store = ProjectStore::load(&root.path().join("child")).unwrap();
        assert_eq!(store.project.name, "Child");
        assert_eq!(store.project.api_base, "https://example.com");
        assert_eq!(store.project.requests.len(), 1);
        assert_eq!(store.project.variables.get("token").unwrap(), "t");
        assert_eq!(store.project.variables.get("id").unwrap(), "2");
    }

    #[test]
    fn test_save_variables_keeps_child_only() {
        let root = tempdir().unwrap();
        write_project(&root.path().join("base"), json!({"requests": [{"endpoint": "/a"}]}));
        let child = root.path().join("child");
        write_project(&child, json!({"name": "Child", "base_project": "../base"}));

        let mut store = ProjectStore::load(&child).unwrap();
        let mut vars = store.project.variables.clone();
        vars.set("next_id", "5");
        store.save_variables(&vars).unwrap();

        let saved: Value =
            serde_json::from_str(&fs::read_to_string(child.join(PROJECT_FILE)).unwrap()).unwrap();
        assert_eq!(saved["variables"], json!({"next_id": "5"}));
        assert!(saved.get("requests").is_none());
    }

    #[test]
    fn test_save_exchange_layout() {
        let root = tempdir().unwrap();
        write_project(
            root.path(),
            json!({
                "api_base": "https://api.example.com",
                "output_path": "out",
                "requests": [{"method": "POST", "endpoint": "/items", "body": {"a": 1}}]
            }),
        );
        let store = ProjectStore::load(root.path()).unwrap();
        let Some(Request::Http(mut request)) =
            store.project.requests[0].build(&store.project.api_base, &store.project.variables)
        else {
            panic!("expected an HTTP request");
        };
        assert_eq!(request.method, HttpMethod::POST);
        request.timestamp = Some(
            chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let response = ApiResponse::from_parts(201, 0.5, r#"{"id": 9}"#.to_string());

        let path = store.save_exchange(&request, &response).unwrap();
        let bucket = root.path().join("out").join("POST api.example.com-items");
        assert_eq!(path, bucket.join("2024-01-02T03-04-05 POST items.json"));

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["request"]["body"], json!({"a": 1}));
        assert_eq!(saved["response"]["status_code"], json!(201));

        let raw_file = bucket.join("raw").join("2024-01-02T03-04-05 POST items.txt");
        let raw = fs::read_to_string(raw_file).unwrap();
        assert_eq!(raw, "{\n    \"id\": 9\n}");
    }
}
