//! Saf betik senaryolari: degerler host tarafindan `get_variable` ile
//! dogrulanir.

use std::ffi::CStr;

use bitscript::Environment;

#[test]
fn arithmetic_into_host_visible_global() {
    let mut environment = Environment::new();
    environment
        .load("sum", "int x = 3;\nint y = 4;\nint z = x + y;\n")
        .unwrap();
    assert_eq!(environment.get_variable("z").unwrap().read::<i32>(), 7);
}

#[test]
fn for_loop_counts_and_scopes_the_induction_variable() {
    let mut environment = Environment::new();
    environment
        .load(
            "loop",
            "int i = 0;\nfor(int n = 0; n < 5; ++n)\n{\n    i = i + 1;\n}\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("i").unwrap().read::<i32>(), 5);
    assert!(environment.get_variable("n").is_none());
}

#[test]
fn while_loop_with_break_and_continue() {
    let mut environment = Environment::new();
    environment
        .load(
            "flow",
            "int i = 0;\nint s = 0;\nwhile(i < 10)\n{\n    ++i;\n    if(i == 3)\n    {\n        continue;\n    }\n    if(i > 6)\n    {\n        break;\n    }\n    s = s + i;\n}\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("i").unwrap().read::<i32>(), 7);
    assert_eq!(environment.get_variable("s").unwrap().read::<i32>(), 18);
}

#[test]
fn if_else_branches() {
    let mut environment = Environment::new();
    environment
        .load(
            "branch",
            "int x = 7;\nint r = 0;\nif(x > 5)\n{\n    r = 1;\n}\nelse\n{\n    r = 2;\n}\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("r").unwrap().read::<i32>(), 1);
}

#[test]
fn operators_split_left_to_right_and_parentheses_group() {
    let mut environment = Environment::new();
    environment
        .load(
            "prec",
            "int a = 2;\nint b = 3;\nint c = 4;\nint grouped = (a + b) * c;\nint flat = a + b * c;\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("grouped").unwrap().read::<i32>(), 20);
    // oncelik yok: a + (b * c), cunku ilk operator bolme noktasidir
    assert_eq!(environment.get_variable("flat").unwrap().read::<i32>(), 14);
}

#[test]
fn literal_types_round_trip() {
    let mut environment = Environment::new();
    environment
        .load(
            "literals",
            "bool flag = true;\nuint32_t u = 10u;\nfloat f = 1.5f;\ndouble d = 2.5;\nfloat g = f * 2.0f;\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("flag").unwrap().read::<u8>(), 1);
    assert_eq!(environment.get_variable("u").unwrap().read::<u32>(), 10);
    assert_eq!(environment.get_variable("f").unwrap().read::<f32>(), 1.5);
    assert_eq!(environment.get_variable("d").unwrap().read::<f64>(), 2.5);
    assert_eq!(environment.get_variable("g").unwrap().read::<f32>(), 3.0);
}

#[test]
fn string_literals_surface_as_c_strings() {
    let mut environment = Environment::new();
    environment
        .load("strings", "const char* s = \"hello\";\n")
        .unwrap();
    let pointer = environment.get_variable("s").unwrap().read::<*const i8>();
    // SAFETY: literal havuzu NUL sonlu kopyayi Environment ile yasatir.
    let text = unsafe { CStr::from_ptr(pointer) };
    assert_eq!(text.to_str().unwrap(), "hello");
}

#[test]
fn comments_and_directives_do_not_shift_line_numbers() {
    let mut environment = Environment::new();
    assert!(environment
        .load(
            "lines",
            "// comment\n#directive\nint a = 1;\nint b = 0;\nint c = a / b;\n",
        )
        .is_err());
    let message = environment.error_message().unwrap();
    assert!(message.starts_with("[Runtime Error] Line 5:"), "{}", message);
    assert!(message.contains("division by zero"), "{}", message);
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let mut environment = Environment::new();
    assert!(environment
        .load("div", "int a = 10;\nint b = 0;\nint c = a / b;\n")
        .is_err());
    let message = environment.error_message().unwrap();
    assert!(message.contains("Line 3"), "{}", message);
    assert!(message.contains("division by zero"), "{}", message);
}

#[test]
fn decimal_division_by_zero_uses_the_epsilon_threshold() {
    let mut environment = Environment::new();
    assert!(environment
        .load("fdiv", "float a = 1.0f;\nfloat b = 0.0f;\nfloat c = a / b;\n")
        .is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("division by zero"));
}

#[test]
fn variable_redefinition_is_a_compile_error() {
    let mut environment = Environment::new();
    assert!(environment.load("redef", "int x = 1;\nint x = 2;\n").is_err());
    let message = environment.error_message().unwrap();
    assert!(message.starts_with("[Compile Error]"), "{}", message);
    assert!(message.contains("variable redefinition ('x')"), "{}", message);
}

#[test]
fn undefined_variable_is_a_compile_error() {
    let mut environment = Environment::new();
    assert!(environment.load("undef", "int x = nope + 1;\n").is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("undefined variable ('nope')"));
}

#[test]
fn block_scopes_release_instances() {
    let mut environment = Environment::new();
    let baseline = environment.instance_count();
    environment
        .load(
            "scopes",
            "{\n    int a = 1;\n    {\n        int b = 2;\n    }\n}\nint keep = 3;\n",
        )
        .unwrap();
    assert_eq!(environment.instance_count(), baseline + 1);
    assert!(environment.get_variable("a").is_none());
    assert!(environment.get_variable("b").is_none());
    assert_eq!(environment.get_variable("keep").unwrap().read::<i32>(), 3);
}

#[test]
fn loop_bodies_recycle_their_stack_storage() {
    // govde scope'u her turda kapanmasa arena tukenirdi
    let mut environment = Environment::new();
    environment
        .load(
            "arena",
            "int total = 0;\nfor(int n = 0; n < 500; ++n)\n{\n    int local = 2;\n    total = total + local;\n}\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("total").unwrap().read::<i32>(), 1000);
}

#[test]
fn reloading_a_program_is_idempotent() {
    let mut environment = Environment::new();
    let source = "int x = 1;\nint y = x + 10;\n";
    environment.load("p", source).unwrap();
    let count = environment.instance_count();
    environment.load("p", source).unwrap();
    assert_eq!(environment.instance_count(), count);
    assert_eq!(environment.get_variable("y").unwrap().read::<i32>(), 11);
}

#[test]
fn reloading_replaces_the_program_body() {
    let mut environment = Environment::new();
    environment.load("p", "int x = 1;\n").unwrap();
    environment.load("p", "int x = 41;\nint y = x + 1;\n").unwrap();
    assert_eq!(environment.get_variable("x").unwrap().read::<i32>(), 41);
    assert_eq!(environment.get_variable("y").unwrap().read::<i32>(), 42);
}

#[test]
fn script_functions_execute_with_parameters_and_return() {
    let mut environment = Environment::new();
    environment
        .load(
            "fns",
            "int add(int a, int b)\n{\n    return a + b;\n}\nint r = add(3, 4);\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("r").unwrap().read::<i32>(), 7);
    assert!(environment.get_variable("a").is_none());
}

#[test]
fn script_function_redeclaration_replaces_the_body() {
    let mut environment = Environment::new();
    environment
        .load(
            "v1",
            "int pick()\n{\n    return 1;\n}\nint r1 = pick();\n",
        )
        .unwrap();
    environment
        .load(
            "v2",
            "int pick()\n{\n    return 2;\n}\nint r2 = pick();\n",
        )
        .unwrap();
    assert_eq!(environment.get_variable("r1").unwrap().read::<i32>(), 1);
    assert_eq!(environment.get_variable("r2").unwrap().read::<i32>(), 2);
}

#[test]
fn address_of_yields_a_usable_pointer() {
    let mut environment = Environment::new();
    environment.load("addr", "int x = 5;\nint* p = &x;\n").unwrap();
    let pointer = environment.get_variable("p").unwrap().read::<*const i32>();
    // SAFETY: x global instance'i Environment yasadikca arena'da kalir.
    assert_eq!(unsafe { *pointer }, 5);
}

#[test]
fn break_outside_a_statement_is_rejected() {
    let mut environment = Environment::new();
    assert!(environment.load("bad", "break\n").is_err());
    assert!(environment
        .error_message()
        .unwrap()
        .contains("unexpected symbol after 'break'"));
}
