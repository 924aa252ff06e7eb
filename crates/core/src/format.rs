use crate::types::VideoSummary;

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format a video summary as human-readable markdown
pub fn format_summary_readable(summary: &VideoSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", summary.title));

    if let Some(duration) = summary.duration_seconds {
        output.push_str(&format!(
            "**Duration:** {} | **Video ID:** {}\n\n",
            format_timestamp(duration as f64),
            summary.video_id
        ));
    }

    output.push_str("## Summary\n\n");
    output.push_str(&summary.detailed_summary);
    output.push_str("\n\n");

    if !summary.topics.is_empty() {
        output.push_str("## Topics\n\n");
        for topic in &summary.topics {
            output.push_str(&format!("• {}\n", topic));
        }
        output.push('\n');
    }

    output.push_str("## Key Points\n\n");
    for (i, point) in summary.key_points.iter().enumerate() {
        match point.start_seconds {
            Some(seconds) => output.push_str(&format!(
                "{}. [{}] {}\n",
                i + 1,
                format_timestamp(seconds),
                point.text
            )),
            None => output.push_str(&format!("{}. {}\n", i + 1, point.text)),
        }
    }

    output
}
