/// Build the fixed instructional prompt for one chunk of serialized log rows.
/// The structure (root cause, affected component, severity, immediate action,
/// long-term fix) is what the report sections are expected to contain.
pub fn analysis_prompt(chunk: &str) -> String {
    format!(
        r#"You are an expert DevOps engineer analyzing production error logs. Please analyze the following logs and provide:

1. **Root Cause**
2. **Affected Component**
3. **Severity** (Critical/High/Medium/Low)
4. **Immediate Action**
5. **Long-term Fix**

Error Logs:
{}"#,
        chunk
    )
}
