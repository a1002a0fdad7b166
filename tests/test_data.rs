//! HTML fixtures shared by the integration tests and benchmarks.
#![allow(dead_code)]

/// A complete article page in the publisher's layout: structured data,
/// meta tags, a byline card, reaction widgets, a line-wrapped code block,
/// a lazily loaded figure and promotional footers.
pub const MEDIUM_ARTICLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Understanding Ownership | by Ada Lovelace | Medium</title>
    <meta property="og:site_name" content="Medium">
    <meta property="og:title" content="Understanding Ownership">
    <meta name="author" content="Ada Lovelace">
    <meta property="article:published_time" content="2024-02-10T08:30:00.000Z">
    <link rel="canonical" href="https://medium.com/@ada/understanding-ownership-1234">
    <script type="application/ld+json">{"@context":"https://schema.org","@type":"NewsArticle","headline":"Understanding Ownership in Rust","author":{"@type":"Person","name":"Ada Lovelace"},"url":"https://medium.com/@ada/understanding-ownership-1234","datePublished":"2024-02-10T08:30:00.000Z"}</script>
</head>
<body>
    <nav><a href="/">Medium</a> Open in app <a href="/m/signin">Sign up</a></nav>
    <article>
        <div class="header">
            <h1>Understanding Ownership in Rust</h1>
            <div class="byline">
                <div><a href="/@ada?source=post_page-----1234">Ada Lovelace</a></div>
                <div><span>Follow</span> · 8 min read · Feb 10, 2024</div>
            </div>
            <div class="reactions">
                <button data-testid="headerClapButton"><svg width="24"></svg></button>
                <span aria-label="responses">12</span>
            </div>
        </div>
        <section>
            <p>Ownership is the feature that lets Rust make memory safety guarantees without a garbage collector.</p>
            <h2>The rules</h2>
            <ol>
                <li>Each value has an owner.</li>
                <li>There can only be one owner at a time.</li>
            </ol>
            <pre><code class="language-rust"><span>fn main() {</span><span>    let s = String::from("hi");</span><span>}</span></code></pre>
            <figure>
                <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" srcset="https://miro.medium.com/small.png 640w, https://miro.medium.com/large.png 1400w" alt="Diagram">
                <figcaption>Moves transfer ownership</figcaption>
            </figure>
            <blockquote><p>Borrowing lets you use a value without taking ownership of it.</p></blockquote>
            <p>Read more about <a href="https://doc.rust-lang.org/book/">the book</a> for details on lifetimes.</p>
        </section>
        <div class="footer"><p>Sign up for our free weekly newsletter.</p></div>
        <div><p>More from Ada Lovelace</p></div>
    </article>
</body>
</html>"#;

pub const MEDIUM_ARTICLE_MARKDOWN: &str = r#"---
title: "Understanding Ownership in Rust"
author: "Ada Lovelace"
source: "https://medium.com/@ada/understanding-ownership-1234"
published: "2024-02-10"
retrieved: "2024-03-16"
---

# Understanding Ownership in Rust

Ownership is the feature that lets Rust make memory safety guarantees without a garbage collector.

## The rules

1. Each value has an owner.
2. There can only be one owner at a time.

```rust
fn main() {
    let s = String::from("hi");
}
```

![Diagram](https://miro.medium.com/large.png)
*Moves transfer ownership*

> Borrowing lets you use a value without taking ownership of it.

Read more about [the book](https://doc.rust-lang.org/book/) for details on lifetimes.
"#;

/// A page from somewhere else entirely.
pub const UNRELATED_PAGE: &str = r#"<html><head><title>Weather</title></head>
<body><main><p>Sunny with a chance of rain later in the afternoon and evening.</p></main></body></html>"#;

/// Declares the publisher but has no article element.
pub const PUBLISHER_WITHOUT_ARTICLE: &str = r#"<html><head>
<meta property="og:site_name" content="Medium"><title>Medium</title></head>
<body><div>Home feed</div></body></html>"#;

/// Same title in every metadata source, each one different.
pub const CONFLICTING_METADATA_PAGE: &str = r#"<html><head>
<title>Document Title</title>
<meta property="og:title" content="Meta Title">
<script type="application/ld+json">{"@type":"Article","headline":"Structured Title"}</script>
</head><body><article><p>Enough words in this paragraph to count as a real piece of body text.</p></article></body></html>"#;

/// An article with captioned figures and inline images.
pub const IMAGE_HEAVY_ARTICLE: &str = r#"<article>
<p>Opening paragraph that is long enough to be recognised as article text.</p>
<figure><img src="https://miro.medium.com/one.png" alt="One"><figcaption>First caption</figcaption></figure>
<figure><picture><source srcset="https://miro.medium.com/two-small.webp 640w, https://miro.medium.com/two.webp 1280w"><img src=""></picture><figcaption>Second caption</figcaption></figure>
<figure><img data-src="https://miro.medium.com/three.png"></figure>
<p>Inline <img src="https://miro.medium.com/icon.png" alt="icon"> image in a paragraph of reasonable length.</p>
</article>"#;

/// Builds an article with `sections` repetitions of mixed content, for
/// benchmarks.
pub fn create_large_article(sections: usize) -> String {
    let mut html = String::from(
        r#"<html><head><title>Large</title><meta property="og:site_name" content="Medium"></head><body><article>"#,
    );
    for i in 0..sections {
        html.push_str(&format!(
            r#"<section>
<h2>Section {i}</h2>
<p>Paragraph {i} has enough text in it to be counted as genuine article content by the pruner.</p>
<div class="byline"><a href="/@writer?source=post_page-----{i}">Writer</a> · 3 min read</div>
<ul><li>Point <strong>{i}</strong></li><li>Another <em>point</em></li></ul>
<pre><code class="language-js"><span>const x = {i};</span><span>console.log(x);</span></code></pre>
<figure><img src="https://miro.medium.com/{i}.png"><figcaption>Figure {i}</figcaption></figure>
<div><p>Sign up to get the next story</p></div>
</section>"#
        ));
    }
    html.push_str("</article></body></html>");
    html
}
