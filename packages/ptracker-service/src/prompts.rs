use serde_json::Value;

pub(crate) const NAME_PLACEHOLDER: &str = "{{name}}";

pub(crate) const PROMISE_SYSTEM: &str = "\
You review passages of text about the politician {{name}}.
Decide whether the passage contains a promise made by {{name}}: a commitment to a future \
outcome that is specific enough to act on and to check afterwards.
Respond with a JSON object holding:
- politician_name: the politician the passage is about.
- is_promise: true only for a commitment that is both actionable and measurable.
- promise_text: the commitment restated as one short, self-contained sentence.
- exact_quote: the shortest span of the passage stating the commitment, copied character for \
character without any edit.
Vague aspirations, slogans and statements about other people are not promises.";

pub(crate) const ACTION_SYSTEM: &str = "\
You review passages of text about the politician {{name}}.
List every concrete action {{name}} has already taken or is currently carrying out. \
Intentions, plans and promises about the future are not actions.
Respond with a JSON object holding an `actions` array. Each item has:
- text: the action restated as one short, self-contained sentence.
- verbatim_quote: the span of the passage describing the action, copied character for \
character without any edit.
Return an empty array when the passage describes no action by {{name}}.";

pub(crate) fn render(template: &str, candidate_name: &str) -> String {
	template.replace(NAME_PLACEHOLDER, candidate_name)
}

pub(crate) fn promise_schema() -> Value {
	serde_json::json!({
		"type": "object",
		"additionalProperties": false,
		"required": ["politician_name", "is_promise", "promise_text", "exact_quote"],
		"properties": {
			"politician_name": { "type": "string" },
			"is_promise": { "type": "boolean" },
			"promise_text": { "type": "string" },
			"exact_quote": { "type": "string" }
		}
	})
}

pub(crate) fn action_schema() -> Value {
	serde_json::json!({
		"type": "object",
		"additionalProperties": false,
		"required": ["actions"],
		"properties": {
			"actions": {
				"type": "array",
				"items": {
					"type": "object",
					"additionalProperties": false,
					"required": ["text", "verbatim_quote"],
					"properties": {
						"text": { "type": "string" },
						"verbatim_quote": { "type": "string" }
					}
				}
			}
		}
	})
}
