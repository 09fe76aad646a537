//! Canned outfit prompts and loading messages

/// Shown as one-click suggestions
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "A black leather jacket with a white t-shirt",
    "A formal blue evening gown",
    "Futuristic sci-fi armor",
    "Vintage 1920s flapper dress",
];

/// Rotated while an attempt is running
pub const LOADING_MESSAGES: [&str; 5] = [
    "AI is creating your look...",
    "Consulting the color palette...",
    "Stitching the virtual seams...",
    "Perfecting the pixels...",
    "Adding the finishing touches...",
];
