/// An entry in the error code registry.
pub struct ErrorEntry {
    pub code: &'static str,
    pub short: &'static str, // brief description for tooling
    pub long: &'static str,  // full explanation for --explain
}

/// All stable error codes.
pub static REGISTRY: &[ErrorEntry] = &[
    // ── Lexer ────────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "CVD-L001",
        short: "unexpected character",
        long: r#"## CVD-L001: unexpected character

The lexer found text that does not start any token: a stray symbol,
an unterminated string, or an integer literal too large for 64 bits.

**Example:**

    var x = 1 # 2;

Strings must close on the line they open. Write very large numbers
with a decimal point so they lex as doubles.
"#,
    },
    // ── Parser ───────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "CVD-P001",
        short: "expected expression",
        long: r#"## CVD-P001: expected expression

An expression was required (an operand, a call argument, a condition)
but the next token cannot start one.

**Example:**

    var y = 1 + ;
"#,
    },
    ErrorEntry {
        code: "CVD-P002",
        short: "unexpected token",
        long: r#"## CVD-P002: unexpected token

A specific token was expected and a different one was found. The
message names both.

**Example:**

    if (x { print(x); }    // missing `)`
"#,
    },
    ErrorEntry {
        code: "CVD-P003",
        short: "unexpected end of file",
        long: r#"## CVD-P003: unexpected end of file

The input ended in the middle of a construct, usually an unclosed
block or a declaration without its name.

**Example:**

    function f() { return 1;
"#,
    },
    ErrorEntry {
        code: "CVD-P004",
        short: "invalid assignment target",
        long: r#"## CVD-P004: invalid assignment target

Only a plain variable name may appear on the left of `=`.

**Example:**

    f() = 1;
"#,
    },
    // ── Compiler ─────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "CVD-C001",
        short: "function declared below the top level",
        long: r#"## CVD-C001: function declared below the top level

Functions do not capture variables, so they may only be declared at
the top level of a program, not inside another function or a block.

**Example:**

    function outer() {
        function inner() { return 1; }
    }

**Fix:** declare `inner` at the top level and pass it what it needs.
"#,
    },
    ErrorEntry {
        code: "CVD-C002",
        short: "duplicate parameter name",
        long: r#"## CVD-C002: duplicate parameter name

Each parameter of a function needs a distinct name.

**Example:**

    function f(a, a) { return a; }
"#,
    },
    ErrorEntry {
        code: "CVD-C003",
        short: "too many parameters or arguments",
        long: r#"## CVD-C003: too many parameters or arguments

A function declaration or a call exceeds 255 parameters or arguments.
"#,
    },
    // ── Virtual machine ──────────────────────────────────────────────────────
    ErrorEntry {
        code: "CVD-V001",
        short: "operand stack overflow",
        long: r#"## CVD-V001: operand stack overflow

A push or reserve needed more slots than the operand stack has left.
Unbounded recursion is the usual cause.

**Example:**

    function down(n) { return down(n + 1); }
    down(0);

Raise the capacity with `--stack-slots` if the recursion is genuinely deep.
"#,
    },
    ErrorEntry {
        code: "CVD-V002",
        short: "operand stack underflow",
        long: r#"## CVD-V002: operand stack underflow

An instruction released more slots than are live. Compiled code never
does this; it indicates hand-built IR with a wrong slot count.
"#,
    },
    ErrorEntry {
        code: "CVD-V003",
        short: "invalid stack slot",
        long: r#"## CVD-V003: invalid stack slot

A slot index pointed past the bottom of the live stack. Compiled code
never does this; it indicates hand-built IR with a wrong slot index.
"#,
    },
    ErrorEntry {
        code: "CVD-V004",
        short: "heap exhausted",
        long: r#"## CVD-V004: heap exhausted

An allocation did not fit in the remaining heap. The heap is a bump
allocator with no collector, so every string and object ever created
stays allocated until the VM is dropped.

Raise the size with `--heap-bytes`.
"#,
    },
    ErrorEntry {
        code: "CVD-V005",
        short: "VM construction failed",
        long: r#"## CVD-V005: VM construction failed

The VM could not be built: a zero-sized stack or heap, stack arrays of
different lengths, or a failed memory mapping.

A failure inside the built-in startup script is reported under the code
of the error that occurred there, e.g. CVD-V004 when the heap is too
small to hold the built-in globals. `--no-startup` skips the script.
"#,
    },
    ErrorEntry {
        code: "CVD-V006",
        short: "unsupported opcode",
        long: r#"## CVD-V006: unsupported opcode

The dispatch table has no handler for an instruction that was reached.
This happens with custom dispatch tables that leave opcodes out.
"#,
    },
    ErrorEntry {
        code: "CVD-V007",
        short: "call left the wrong stack depth",
        long: r#"## CVD-V007: call left the wrong stack depth

A unit run by `exec` or `call` must leave exactly one value, its result,
above the stack depth it started from. Anything else means the unit ended
without a matching return.
"#,
    },
    ErrorEntry {
        code: "CVD-V008",
        short: "unsupported value tag",
        long: r#"## CVD-V008: unsupported value tag

A tag byte read from memory is not one of the known value kinds.
"#,
    },
    ErrorEntry {
        code: "CVD-V009",
        short: "unsupported constant payload",
        long: r#"## CVD-V009: unsupported constant payload

A value tagged as a constant is not `undefined`, `null`, `true` or `false`.
"#,
    },
    ErrorEntry {
        code: "CVD-V010",
        short: "malformed unit",
        long: r#"## CVD-V010: malformed unit

A compiled unit with no instructions or no entry point was passed to
`exec` or called. It is rejected before anything runs.
"#,
    },
    ErrorEntry {
        code: "CVD-V011",
        short: "invalid heap access",
        long: r#"## CVD-V011: invalid heap access

A heap read or write fell outside the allocated part of the heap, or a
heap reference pointed at a block of the wrong kind.
"#,
    },
    ErrorEntry {
        code: "CVD-V012",
        short: "type error",
        long: r#"## CVD-V012: type error

An operator received a value it cannot work on.

**Example:**

    1 + null;
    -"text";

Arithmetic accepts numbers; `+` also accepts a string on either side.
"#,
    },
    ErrorEntry {
        code: "CVD-V013",
        short: "value is not a function",
        long: r#"## CVD-V013: value is not a function

A call was made on something other than a function.

**Example:**

    var n = 3;
    n();
"#,
    },
    ErrorEntry {
        code: "CVD-V014",
        short: "undefined global",
        long: r#"## CVD-V014: undefined global

A name was read that is not a local, a parameter, or a defined global.

**Example:**

    print(total);   // `total` was never declared
"#,
    },
    ErrorEntry {
        code: "CVD-V015",
        short: "unknown function id",
        long: r#"## CVD-V015: unknown function id

A closure or `exec` referred to a function id that was never registered.
"#,
    },
    ErrorEntry {
        code: "CVD-V016",
        short: "host call nesting too deep",
        long: r#"## CVD-V016: host call nesting too deep

Every time a host function calls back into the VM (the `call` built-in,
or a native using `Vm::call`) the call nests one level deeper on the
host's own stack. Nesting is capped at 128 levels.

**Example:**

    function f(n) { return call(f, n + 1); }
    f(0);

Call the function directly: ordinary script calls do not nest on the
host stack and are only limited by `--stack-slots`.
"#,
    },
];

/// Look up an error entry by code (e.g. `"CVD-V001"`).
pub fn lookup(code: &str) -> Option<&'static ErrorEntry> {
    REGISTRY.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}
