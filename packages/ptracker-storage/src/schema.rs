pub fn render_schema(promise_dim: u32, action_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded
		.replace("<PROMISE_DIM>", &promise_dim.to_string())
		.replace("<ACTION_DIM>", &action_dim.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_candidates.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_candidates.sql")),
				"tables/002_promises.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_promises.sql")),
				"tables/003_actions.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_actions.sql")),
				"tables/004_citations.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_citations.sql")),
				"tables/005_promise_action_links.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_promise_action_links.sql")),
				"tables/006_analysis_jobs.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_analysis_jobs.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
