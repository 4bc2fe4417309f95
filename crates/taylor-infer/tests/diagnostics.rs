//! Snapshot tests for `diagnostics::render_diagnostic`. The rendered report
//! is a multi-line string with source excerpts and underlines -- too shaped
//! to usefully assert with `assert_eq!` inline, so it's the one place in
//! this workspace that reaches for `insta`.

use taylor_ast::Span;
use taylor_infer::diagnostics::render_diagnostic;
use taylor_infer::TypeError;

#[test]
fn unbound_identifier_report() {
    let source = "val total = price + shiping\n";
    let span = Span::new(20, 27);
    let error = TypeError::unbound_identifier("shiping", span);

    let rendered = render_diagnostic(&error, source, "quote.taylor");
    insta::assert_snapshot!(rendered);
}

#[test]
fn non_exhaustive_match_report() {
    let source = "match xs {\n  case Cons(head, tail) => head\n}\n";
    let span = Span::new(0, 45);
    let error = TypeError::non_exhaustive_match(&["Nil".to_string()], span);

    let rendered = render_diagnostic(&error, source, "list.taylor");
    insta::assert_snapshot!(rendered);
}
