//! End-to-end tests driving the parser and code generator together, plus a
//! handful of invariants the buffer and stacks must hold after any walk.

use crate::front::parse;
use crate::middle::Op;

fn generate(src: &str) -> (String, String) {
    let codegen = parse(src).expect("source should parse");
    assert_eq!(codegen.value_stack_len(), codegen.type_stack_len());
    let outcome = codegen.outcome();
    (outcome.program, outcome.errors)
}

#[test]
fn s1_minimal_main_with_output() {
    let (program, errors) = generate("void main(void) { output(2); }");
    assert!(program.contains("PRINT, #2"));
    assert_eq!(errors, "The input program is semantically correct");
}

#[test]
fn s2_undefined_identifier() {
    let (program, errors) = generate("void main(void) { output(a); }");
    assert_eq!(errors, "#1 : Semantic Error! 'a' is not defined.\n");
    assert_eq!(program, "The code has not been generated.");
}

#[test]
fn s3_break_outside_loop() {
    let (_, errors) = generate("void main(void) { break; }");
    assert_eq!(errors, "#1 : Semantic Error! No 'for' found for 'break'.\n");
}

#[test]
fn s4_type_mismatch_with_array() {
    let (_, errors) = generate("void main(void) { int a[3]; int b; b = a; }");
    assert!(errors.contains("Type mismatch in operands, Got array instead of int"));
}

#[test]
fn s5_arity_mismatch() {
    let (_, errors) = generate("int f(int x) { return x; } void main(void) { output(f(1,2)); }");
    assert!(errors.contains("Mismatch in numbers of arguments of 'f'"));
}

#[test]
fn s6_for_step_runs_after_body() {
    let codegen = parse("void main(void) { int i; for (i=0; i<3; i=i+1) output(i); }")
        .expect("source should parse");
    let pb = codegen.pb();
    let output_idx = pb
        .iter()
        .position(|instr| instr.op == Op::Print)
        .expect("PRINT instruction");
    // the step-expression's ADD (i = i + 1) must follow the PRINT and precede
    // the loop's back-edge JP, which is the last instruction before the
    // block that follows the patched condition check.
    let add_idx = pb
        .iter()
        .enumerate()
        .skip(output_idx)
        .find(|(_, instr)| instr.op == Op::Add)
        .map(|(i, _)| i)
        .expect("ADD instruction for the step-expression");
    assert!(add_idx > output_idx);
}

#[test]
fn property_reserved_instructions_are_assign_then_jp() {
    let codegen = parse("void main(void) {}").expect("source should parse");
    let pb = codegen.pb();
    assert_eq!(pb.get(0).op, Op::Assign);
    assert_eq!(pb.get(1).op, Op::Jp);
}

#[test]
fn property_startup_jump_targets_main_on_success() {
    let codegen = parse("void main(void) {}").expect("source should parse");
    let main_pb_idx = codegen
        .func_map()
        .get("main")
        .expect("main registered")
        .borrow()
        .pb_idx;
    let outcome = codegen.outcome();
    assert!(outcome.errors.starts_with("The input program is semantically correct"));
    let first_line = outcome.program.lines().nth(1).unwrap();
    assert!(first_line.contains(&format!("JP, {main_pb_idx}")));
}

#[test]
fn property_temp_addresses_are_unique_and_increasing() {
    let codegen = parse("void main(void) { int a; int b; int c; }").expect("source should parse");
    let addrs: Vec<i64> = codegen
        .symtab()
        .get_scope_symbols(0)
        .iter()
        .filter(|s| matches!(s.lexeme.as_str(), "a" | "b" | "c"))
        .map(|s| s.address.text.parse().unwrap())
        .collect();
    let mut sorted = addrs.clone();
    sorted.sort();
    assert_eq!(addrs, sorted);
    assert!(addrs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn property_scope_is_balanced_after_a_block() {
    let before = parse("void main(void) {}").expect("parses").symtab().len();
    let after = parse("void main(void) { { int a; } }").expect("parses").symtab().len();
    assert_eq!(before, after);
}

#[test]
fn property_no_error_means_code_was_generated() {
    let (program, _) = generate("void main(void) { output(1); }");
    assert_ne!(program, "The code has not been generated.");
}

#[test]
fn property_any_error_means_no_code_was_generated() {
    let (program, _) = generate("void main(void) { output(a); }");
    assert_eq!(program, "The code has not been generated.");
}

#[test]
fn break_target_matches_loop_exit() {
    let codegen = parse(
        "void main(void) { int i; for (i=0; i<3; i=i+1) { if (i<1) break; output(i); } }",
    )
    .expect("source should parse");
    let pb = codegen.pb();
    let break_instr = pb
        .iter()
        .find(|instr| instr.op == Op::Jp && !instr.a.is_empty())
        .expect("at least one JP from break backpatch");
    // the back-edge JP (to the loop label) is the last JP before this one's
    // target; confirm the break's target is a later index than the PRINT.
    let print_idx = pb.iter().position(|i| i.op == Op::Print).unwrap();
    let target: usize = break_instr.a.parse().unwrap();
    assert!(target > print_idx);
}

#[test]
fn function_call_round_trips_a_value() {
    let (program, errors) = generate("int f(int x) { return x; } void main(void) { output(f(1)); }");
    assert_eq!(errors, "The input program is semantically correct");
    assert!(program.contains("PRINT"));
}

#[test]
fn array_declaration_reserves_contiguous_temps() {
    let codegen = parse("void main(void) { int a[4]; int b; }").expect("source should parse");
    let symbols = codegen.symtab().get_scope_symbols(0);
    let a = symbols.iter().find(|s| s.lexeme == "a").unwrap();
    let b = symbols.iter().find(|s| s.lexeme == "b").unwrap();
    let a_addr: i64 = a.address.text.parse().unwrap();
    let b_addr: i64 = b.address.text.parse().unwrap();
    assert_eq!(b_addr - a_addr, 4 * 4);
}
