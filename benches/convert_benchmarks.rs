use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use chrono::NaiveDate;
use medium_export::convert::{convert_html, render_markdown, ExportOptions};
use medium_export::dom::Document;
use medium_export::extract::{prune, ArticleExtractor, Page};
use std::time::Duration;

#[path = "../tests/test_data.rs"]
mod test_data;
use test_data::*;

fn retrieved() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for sections in [1, 10, 100] {
        let html = create_large_article(sections);
        group.bench_with_input(BenchmarkId::new("document", sections), &html, |b, html| {
            b.iter(|| black_box(Document::parse(html)));
        });
    }

    group.finish();
}

fn bench_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune");

    for sections in [1, 10, 100] {
        let doc = Document::parse(&create_large_article(sections));
        let article = doc.find_first(doc.root(), "article").unwrap();

        group.bench_with_input(BenchmarkId::new("article", sections), &doc, |b, doc| {
            b.iter(|| {
                let (mut working, root) = doc.clone_subtree(article);
                black_box(prune(&mut working, root))
            });
        });
    }

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let extractor = ArticleExtractor::new();
    let options = ExportOptions::default();
    let mut group = c.benchmark_group("convert");

    for sections in [1, 10, 100] {
        let page = Page::new(create_large_article(sections), "https://medium.com/p/bench");
        let article = extractor
            .extract_on(&page, retrieved())
            .into_result()
            .unwrap();

        group.bench_with_input(
            BenchmarkId::new("markdown", sections),
            &article.article_html,
            |b, html| {
                b.iter(|| black_box(convert_html(html, &options)));
            },
        );
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let extractor = ArticleExtractor::new();
    let page = Page::new(MEDIUM_ARTICLE_PAGE, "https://medium.com/p/1234");

    let mut group = c.benchmark_group("end_to_end");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("medium_article", |b| {
        b.iter(|| {
            let article = extractor.extract_on(&page, retrieved()).into_result().unwrap();
            black_box(render_markdown(
                &article.metadata,
                &article.article_html,
                &ExportOptions::default(),
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_prune, bench_convert, bench_end_to_end);
criterion_main!(benches);
