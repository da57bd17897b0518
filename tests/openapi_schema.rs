use serde_json::Value;

#[test]
fn openapi_describes_task_listing_and_roles() -> anyhow::Result<()> {
    let doc = teamsync::docs::build_openapi(8000)?;
    let v = serde_json::to_value(&doc)?;

    let schemas = v
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .expect("components.schemas must exist");

    for name in ["Workspace", "Membership", "Role", "TaskPage", "Pagination", "Permission"] {
        assert!(schemas.contains_key(name), "OpenAPI missing schema '{}'", name);
    }

    let params = v
        .pointer("/paths/~1workspaces~1{workspace_id}~1tasks/get/parameters")
        .and_then(Value::as_array)
        .expect("task listing parameters must exist");
    let names: Vec<&str> = params.iter().filter_map(|p| p["name"].as_str()).collect();
    for k in ["workspace_id", "status", "priority", "assigned_to", "keyword", "due_date", "page_size", "page_number"] {
        assert!(names.contains(&k), "task listing missing parameter '{}'", k);
    }

    assert_eq!(v.pointer("/servers/0/url"), Some(&Value::from("http://localhost:8000")));
    Ok(())
}
