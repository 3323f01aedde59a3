use pretty_assertions::assert_eq;
use treelox::testing::SharedOutput;
use treelox::{Lox, LoxError};

fn run(source: &str) -> (String, Result<(), LoxError>) {
    let out = SharedOutput::new();
    let mut lox = Lox::with_output(Box::new(out.clone()));
    let result = lox.run(source);
    (out.contents(), result)
}

fn assert_output(source: &str, expected: &str) {
    let (out, result) = run(source);
    if let Err(e) = result {
        panic!("script failed:\n{}\nError: {}", source, e);
    }
    assert_eq!(out, expected);
}

#[test]
fn fibonacci() {
    assert_output(
        r#"
        fn fib(n) {
            if (n < 2) return n;
            return fib(n - 2) + fib(n - 1);
        }
        for (var i = 0; i < 10; i = i + 1) {
            print fib(i);
        }
        "#,
        "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n",
    );
}

#[test]
fn closures_resolve_names_in_their_declaring_scope() {
    assert_output(
        r#"
        var a = "global";
        {
            fn showA() {
                print a;
            }
            showA();
            var a = "block";
            showA();
        }
        "#,
        "global\nblock\n",
    );
}

#[test]
fn functions_are_values() {
    assert_output(
        r#"
        fn twice(f, x) { return f(f(x)); }
        fn inc(x) { return x + 1; }
        var g = inc;
        print twice(g, 1);
        print g == inc;
        "#,
        "3\ntrue\n",
    );
}

#[test]
fn adder_factory() {
    assert_output(
        r#"
        fn makeAdder(n) {
            fn add(x) { return x + n; }
            return add;
        }
        var add2 = makeAdder(2);
        var add10 = makeAdder(10);
        print add2(1);
        print add10(1);
        print add2 == add10;
        "#,
        "3\n11\nfalse\n",
    );
}

#[test]
fn nested_return_inside_loops() {
    assert_output(
        r#"
        fn firstOver(limit) {
            for (var i = 0; ; i = i + 1) {
                while (true) {
                    if (i * i > limit) return i;
                    i = i + 1;
                }
            }
        }
        print firstOver(50);
        print "done";
        "#,
        "8\ndone\n",
    );
}

#[test]
fn string_building() {
    assert_output(
        r#"
        var s = "";
        var i = 0;
        while (i < 3) { s = s + "ab"; i = i + 1; }
        print s;
        print "multi
line";
        "#,
        "ababab\nmulti\nline\n",
    );
}

#[test]
fn ternary_and_logic_mix() {
    assert_output(
        r#"
        fn sign(n) { return n < 0 ? "negative" : n == 0 ? "zero" : "positive"; }
        print sign(-3);
        print sign(0);
        print sign(4);
        print nil or false ? "t" : "f";
        "#,
        "negative\nzero\npositive\nf\n",
    );
}

#[test]
fn two_syntax_errors_no_output() {
    let (out, result) = run("print \"start\";\nvar = 1;\nprint (2;\nprint \"end\";");
    assert_eq!(out, "");
    match result {
        Err(LoxError::Static(errors)) => {
            let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            assert_eq!(
                rendered,
                vec![
                    "[line 2] Error at '=': Expect variable name.",
                    "[line 3] Error at ';': Expect ')' after expression.",
                ]
            );
        }
        other => panic!("expected static errors, got {:?}", other),
    }
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let (out, result) = run("print \"before\";\nprint 1 / 0;\nprint \"after\";");
    assert_eq!(out, "before\n");
    match result {
        Err(LoxError::Runtime(err)) => {
            assert_eq!(err.to_string(), "Division by zero.\n[line 2]");
        }
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn deep_recursion_then_overflow() {
    assert_output(
        "fn c(n) { if (n > 0) return c(n - 1); return 0; }\nprint c(1000);",
        "0\n",
    );
    let (out, result) = run("fn c(n) { return c(n + 1); }\nprint \"start\";\nc(0);");
    assert_eq!(out, "start\n");
    match result {
        Err(LoxError::Runtime(err)) => assert_eq!(err.to_string(), "Stack overflow.\n[line 1]"),
        other => panic!("expected runtime error, got {:?}", other),
    }
}
