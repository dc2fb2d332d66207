//! Shared fixtures for the verlib integration suites

use verlib::prelude::*;

/// Header carrying the bearer credential the fixture auth provider accepts
pub const ADMIN_TOKEN: &str = "Bearer test-admin";

/// Library exercised by every suite
///
/// - `add(a, b)`, `foo()` and `fail()` in the default module
/// - `math.mul(a, b)`
/// - `users.whoami(ctx)`, which echoes the `x-user` header through the context
/// - `admin.reset()`, private
pub fn calculator_lib(policy: ProcedureFailurePolicy) -> Result<VerLib, RegistryError> {
    let mut lib = VerLib::with_config("calculator", VerLibConfig::new().failure_policy(policy));

    lib.register("add", Signature::new(["a", "b"]), |args| {
        Ok(args.get::<i64>("a")? + args.get::<i64>("b")?)
    })?;
    lib.register("foo", Signature::empty(), |_args| Ok(1))?;
    lib.register("fail", Signature::empty(), |_args| -> Result<(), ProcedureError> {
        Err(ProcedureError::failed("intentional failure"))
    })?;

    let mut math = VerModule::new("math");
    math.register("mul", Signature::new(["a", "b"]), |args| {
        Ok(args.get::<i64>("a")? * args.get::<i64>("b")?)
    })?;
    lib.declare_module(math)?;

    let mut users = VerModule::new("users");
    users.register("whoami", Signature::empty().with_context("ctx"), |args| {
        Ok(args
            .context()
            .and_then(|ctx| ctx.get_str("user"))
            .unwrap_or("anonymous")
            .to_string())
    })?;
    lib.declare_module(users)?;

    let mut admin = VerModule::with_access_level("admin", AccessLevel::private());
    admin.register("reset", Signature::empty(), |_args| Ok("reset"))?;
    lib.declare_module(admin)?;

    lib.set_context_builder(|headers: &HttpHeaders, _request: &JsonRpcRequest| {
        match headers.get("x-user") {
            Some(user) => Context::new().with("user", user),
            None => Context::new(),
        }
    });
    lib.set_auth_provider(
        |headers: &HttpHeaders, _request: &JsonRpcRequest, _context: &Context| {
            if headers.get("authorization") == Some(ADMIN_TOKEN) {
                AccessLevel::private()
            } else {
                AccessLevel::public()
            }
        },
    );

    Ok(lib)
}
