//! Prompt shaping for the content model.
//!
//! The JSON contract the model must honor is described in one place and
//! varies only by whether image keywords are requested.

/// Minimum accepted prompt length, in characters, after trimming.
pub const MIN_PROMPT_CHARS: usize = 10;

const IMAGES_SUFFIX: &str =
    "Include descriptive keywords for each slide to find relevant images.";
const TEXT_ONLY_SUFFIX: &str =
    "Do not include keywords or images in the slides, focus only on textual content.";

/// Append the instruction matching the image mode to a user prompt.
pub fn shape_prompt(prompt: &str, include_images: bool) -> String {
    let suffix = if include_images {
        IMAGES_SUFFIX
    } else {
        TEXT_ONLY_SUFFIX
    };
    format!("{}\n\n{}", prompt.trim_end(), suffix)
}

/// Build the system instructions describing the reply format.
pub fn system_instructions(include_images: bool) -> String {
    let mut fields = vec![
        r#""title": a concise title for the slide"#.to_string(),
        r#""description": detailed content for the slide"#.to_string(),
    ];
    if include_images {
        fields.push(
            r#""keywords": an array of 3 to 5 concrete, visual search terms describing a photo that would illustrate the slide"#
                .to_string(),
        );
        fields.push(r#""image": an empty string, filled in later"#.to_string());
    }

    let field_list = fields
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{}. {}", i + 1, f))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a professional presentation designer. Create a structured PowerPoint \
         presentation based on the user's prompt.\n\
         Your output must be a valid JSON array of slides. Each slide must have:\n\
         {field_list}\n\n\
         Format your response ONLY as a valid JSON array of objects. Do not include any \
         explanations or additional text.\n\
         Example format:\n{}",
        example(include_images)
    )
}

fn example(include_images: bool) -> &'static str {
    if include_images {
        r#"[
  {"title": "Introduction", "description": "This is the introduction slide.", "keywords": ["sunrise", "mountain", "horizon"], "image": ""},
  {"title": "Key Points", "description": "These are the key points.", "keywords": ["notebook", "desk", "pen"], "image": ""}
]"#
    } else {
        r#"[
  {"title": "Introduction", "description": "This is the introduction slide."},
  {"title": "Key Points", "description": "These are the key points."}
]"#
    }
}

/// Whether a prompt is long enough to forward.
pub fn is_acceptable_prompt(prompt: &str) -> bool {
    prompt.trim().chars().count() >= MIN_PROMPT_CHARS
}
