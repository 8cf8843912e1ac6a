//! Prompt construction for persona replies

use std::fmt::Write as _;

use board_core::{Comment, Post};

/// Prompt for the persona's first comment on a new post
pub fn post_prompt(post: &Post) -> String {
    format!(
        "Post Title: {}\nPost Content: {}\n\nPlease write a reply to this post.",
        post.title, post.body
    )
}

/// Prompt for answering the last comment of `chain`
///
/// `chain` is the conversation oldest first, ending with the comment being
/// answered.
pub fn thread_prompt(post: &Post, chain: &[&Comment]) -> String {
    let mut prompt = format!(
        "Post Title: {}\nPost Content: {}\n\nConversation:\n",
        post.title, post.body
    );
    for comment in chain {
        let _ = writeln!(prompt, "{}: {}", comment.author.name, comment.body);
    }
    if let Some(last) = chain.last() {
        let _ = write!(
            prompt,
            "\nPlease write a reply to {}'s latest comment.",
            last.author.name
        );
    }
    prompt
}
