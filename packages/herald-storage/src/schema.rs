const INIT_SQL: &str = include_str!("../../../sql/init.sql");

pub fn render_schema(vector_dim: u32) -> String {
	expand_includes(INIT_SQL).replace("<VECTOR_DIM>", &vector_dim.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		match line.trim().strip_prefix("\\ir ").map(str::trim) {
			Some("00_extensions.sql") =>
				out.push_str(include_str!("../../../sql/00_extensions.sql")),
			Some("tables/001_issues.sql") =>
				out.push_str(include_str!("../../../sql/tables/001_issues.sql")),
			Some("tables/002_articles.sql") =>
				out.push_str(include_str!("../../../sql/tables/002_articles.sql")),
			Some("tables/003_issue_embeddings.sql") =>
				out.push_str(include_str!("../../../sql/tables/003_issue_embeddings.sql")),
			_ => out.push_str(line),
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_every_table_with_the_vector_dim() {
		let sql = render_schema(768);

		assert!(!sql.contains("\\ir "));
		assert!(!sql.contains("<VECTOR_DIM>"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS issues"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS articles"));
		assert!(sql.contains("vec vector(768) NOT NULL"));
	}
}
