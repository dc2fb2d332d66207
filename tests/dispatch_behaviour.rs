//! Dispatch behaviour
//!
//! Resolution, registration, access levels, parameter binding, context
//! injection and failure handling, driven through [`VerLib::handle`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use tracing_test::traced_test;
use verlib::prelude::*;
use verlib::{DEFAULT_MODULE, ProcedureDescription, error_codes};
use verlib_integration_tests::{ADMIN_TOKEN, calculator_lib};

fn lib() -> VerLib {
    calculator_lib(ProcedureFailurePolicy::Propagate).unwrap()
}

fn call(lib: &VerLib, request: Value) -> Value {
    call_with(lib, request, &HttpHeaders::new())
}

fn call_with(lib: &VerLib, request: Value, headers: &HttpHeaders) -> Value {
    serde_json::to_value(lib.handle(request, headers).unwrap()).unwrap()
}

fn invalid_params(id: i64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": -32602, "message": "Invalid method parameter(s).", "data": null}
    })
}

mod resolution {
    use super::*;

    #[test]
    fn test_qualified_method_needs_declared_module_and_procedure() {
        let lib = lib();

        for method in ["stats.mean", "math.add", "math.mul.twice", ".mul", "math."] {
            let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": method}));
            assert_eq!(response["error"]["code"], -32601, "method: {}", method);
            assert_eq!(
                response["error"]["message"],
                format!("The procedure '{}' was not found on the server.", method)
            );
        }

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "math.mul", "params": [6, 7]}));
        assert_eq!(response["result"], 42);
    }

    #[test]
    fn test_unqualified_method_only_searches_default_module() {
        let lib = lib();

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "mul", "params": [6, 7]}));
        assert_eq!(response["error"]["code"], -32601);

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": [6, 7]}));
        assert_eq!(response["result"], 13);
    }

    #[test]
    fn test_default_module_is_not_addressable_by_name() {
        let lib = lib();
        let method = format!("{}.add", DEFAULT_MODULE);
        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": [1, 2]}));
        assert_eq!(response["error"]["code"], -32601);
    }
}

mod registration {
    use super::*;

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut lib = lib();
        let err = lib
            .register("add", Signature::new(["x"]), |_args| Ok("replaced"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::ProcedureAlreadyRegistered {
                module: "_default_".to_string(),
                procedure: "add".to_string(),
            }
        );

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": [42, 13]}));
        assert_eq!(response["result"], 55);
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let mut lib = lib();
        let err = lib.declare_module(VerModule::new("math")).unwrap_err();
        assert_eq!(err, RegistryError::ModuleAlreadyDeclared("math".to_string()));
    }

    #[test]
    fn test_default_module_name_cannot_be_declared() {
        let mut lib = lib();
        let mut shadow = VerModule::new(DEFAULT_MODULE);
        shadow
            .register("bar", Signature::new(["x"]), |args| args.get::<i64>("x"))
            .unwrap();

        let err = lib.declare_module(shadow).unwrap_err();
        assert_eq!(err, RegistryError::ModuleAlreadyDeclared(DEFAULT_MODULE.to_string()));

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "bar", "params": [2]}));
        assert_eq!(response["error"]["code"], -32601);

        let default_entries = lib
            .describe()
            .into_iter()
            .filter(|d| d.module == DEFAULT_MODULE)
            .count();
        assert_eq!(default_entries, lib.default_module().len());
    }

    #[test]
    fn test_misplaced_context_rejected_at_registration() {
        use verlib::{ParamSpec, SignatureError};

        let err = Signature::from_params(vec![ParamSpec::context("ctx"), ParamSpec::value("a")])
            .unwrap_err();
        assert_eq!(err, SignatureError::MisplacedContext("ctx".to_string()));

        let signature =
            Signature::from_params(vec![ParamSpec::value("a"), ParamSpec::context("ctx")]).unwrap();
        assert_eq!(signature.arity(), 1);
        assert!(signature.takes_context());
    }

    #[test]
    fn test_describe_lists_everything_in_order() {
        let lib = lib();
        let described: Vec<(String, String, usize)> = lib
            .describe()
            .into_iter()
            .map(|ProcedureDescription { module, name, num_params }| (module, name, num_params))
            .collect();

        assert_eq!(
            described,
            vec![
                ("_default_".to_string(), "add".to_string(), 2),
                ("_default_".to_string(), "foo".to_string(), 0),
                ("_default_".to_string(), "fail".to_string(), 0),
                ("math".to_string(), "mul".to_string(), 2),
                ("users".to_string(), "whoami".to_string(), 1),
                ("admin".to_string(), "reset".to_string(), 0),
            ]
        );
        assert_eq!(
            serde_json::to_value(lib.import_lib()).unwrap()["id"],
            Value::Null
        );
    }
}

mod access {
    use super::*;

    #[test]
    fn test_lattice_properties() {
        let public = AccessLevel::public();
        let private = AccessLevel::private();

        assert!(private.clears(&public));
        assert!(!public.clears(&private));
        assert!(public.clears(&public));
        assert!(private.clears(&private));

        let staff = AccessLevel::new();
        let left = &(&public | &staff) | &private;
        let right = &private | &(&staff | &public);
        assert_eq!(left, right);
        assert!(left.clears(&staff));
        assert!(left.clears(&private));
        assert!(!private.clears(&staff));
    }

    #[test]
    #[traced_test]
    fn test_private_procedure_needs_credential() {
        let lib = lib();
        let request = json!({"jsonrpc": "2.0", "id": 5, "method": "admin.reset"});

        assert_eq!(
            call(&lib, request.clone()),
            json!({
                "jsonrpc": "2.0",
                "id": 5,
                "error": {
                    "code": error_codes::NOT_AUTHORIZED,
                    "message": "Insufficient privileges to invoke procedure.",
                    "data": null
                }
            })
        );
        assert!(logs_contain("insufficient access level"));

        let headers: HttpHeaders = [("Authorization", ADMIN_TOKEN)].into_iter().collect();
        assert_eq!(
            call_with(&lib, request, &headers),
            json!({"jsonrpc": "2.0", "id": 5, "result": "reset"})
        );
    }

    #[test]
    fn test_authorization_precedes_binding() {
        let lib = lib();
        // Wrong arity, but the caller is rejected before params are looked at
        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "admin.reset", "params": [1]}));
        assert_eq!(response["error"]["code"], -32501);
    }

    #[test]
    fn test_custom_level_hierarchy() {
        let staff = AccessLevel::new();
        let manager = &staff | &AccessLevel::new();

        let mut lib = VerLib::new("office");
        lib.register_with_access("payroll", Signature::empty(), manager.clone(), |_args| Ok(true))
            .unwrap();
        lib.register_with_access("rota", Signature::empty(), staff.clone(), |_args| Ok(true))
            .unwrap();

        let caller = staff.clone();
        lib.set_auth_provider(move |_h: &HttpHeaders, _r: &JsonRpcRequest, _c: &Context| caller.clone());

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "rota"}));
        assert_eq!(response["result"], true);
        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "payroll"}));
        assert_eq!(response["error"]["code"], -32501);
    }
}

mod binding {
    use super::*;

    #[test]
    fn test_positional_and_named_add() {
        let lib = lib();
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": [42, 13]})),
            json!({"jsonrpc": "2.0", "id": 1, "result": 55})
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 2, "method": "add", "params": {"a": 42, "b": 13}})),
            json!({"jsonrpc": "2.0", "id": 2, "result": 55})
        );
    }

    #[test]
    fn test_arity_and_name_mismatches() {
        let lib = lib();
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 3, "method": "add", "params": [13]})),
            invalid_params(3)
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 4, "method": "add", "params": [1, 2, 3]})),
            invalid_params(4)
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 5, "method": "add", "params": {"a": 5, "b": 4, "c": 8}})),
            invalid_params(5)
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 6, "method": "add", "params": {"a": 5, "c": 4}})),
            invalid_params(6)
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 7, "method": "add"})),
            invalid_params(7)
        );
    }

    #[test]
    fn test_zero_arity_with_absent_or_empty_params() {
        let lib = lib();
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "foo"})),
            json!({"jsonrpc": "2.0", "id": 1, "result": 1})
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 2, "method": "foo", "params": {}})),
            json!({"jsonrpc": "2.0", "id": 2, "result": 1})
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 3, "method": "foo", "params": [1]})),
            invalid_params(3)
        );
    }

    #[test]
    fn test_context_slot_filled_from_headers() {
        let lib = lib();
        let headers: HttpHeaders = [("X-User", "alice")].into_iter().collect();

        assert_eq!(
            call_with(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "users.whoami"}), &headers),
            json!({"jsonrpc": "2.0", "id": 1, "result": "alice"})
        );
        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "users.whoami"}))["result"],
            "anonymous"
        );

        // The context slot cannot be supplied by the caller
        let response = call_with(
            &lib,
            json!({"jsonrpc": "2.0", "id": 1, "method": "users.whoami", "params": {"ctx": {"user": "mallory"}}}),
            &headers,
        );
        assert_eq!(response["error"]["code"], -32602);
    }
}

mod notifications {
    use super::*;

    #[test]
    fn test_notification_runs_procedure() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let mut lib = VerLib::new("counter");
        lib.register("tick", Signature::new(["by"]), move |args| {
            let by: usize = args.get("by")?;
            Ok(counter.fetch_add(by, Ordering::SeqCst) + by)
        })
        .unwrap();

        assert_eq!(
            call(&lib, json!({"jsonrpc": "2.0", "method": "tick", "params": [3]})),
            json!({"jsonrpc": "2.0", "id": null, "result": null})
        );
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 9, "method": "tick", "params": [2]}));
        assert_eq!(response["result"], 5);
    }

    #[test]
    fn test_notification_errors_are_still_reported() {
        let lib = lib();
        let response = call(&lib, json!({"jsonrpc": "2.0", "method": "add", "params": [1]}));
        assert_eq!(response["error"]["code"], -32602);
        assert_eq!(response["id"], Value::Null);
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_propagate_policy_returns_error_to_caller() {
        let lib = lib();
        let err = lib
            .handle(json!({"jsonrpc": "2.0", "id": 1, "method": "fail"}), &HttpHeaders::new())
            .unwrap_err();
        assert!(err.to_string().contains("procedure 'fail' failed"));
    }

    #[test]
    fn test_bad_argument_type_is_a_procedure_failure() {
        let lib = calculator_lib(ProcedureFailurePolicy::InternalError).unwrap();
        let response = call(&lib, json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": ["x", 1]}));
        assert_eq!(
            response,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32603, "message": "Internal error", "data": null}
            })
        );
    }

    #[test]
    fn test_procedure_error_policy() {
        let lib = calculator_lib(ProcedureFailurePolicy::ProcedureError).unwrap();
        let response = call(&lib, json!({"jsonrpc": "2.0", "id": "f", "method": "fail"}));
        assert_eq!(
            response,
            json!({
                "jsonrpc": "2.0",
                "id": "f",
                "error": {
                    "code": -32500,
                    "message": "An error occurred during the execution of the procedure.",
                    "data": null
                }
            })
        );
    }
}

#[test]
fn test_library_is_shareable_across_threads() {
    let lib = Arc::new(lib());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let lib = Arc::clone(&lib);
            std::thread::spawn(move || {
                let response = call(&lib, json!({"jsonrpc": "2.0", "id": i, "method": "add", "params": [i, i]}));
                assert_eq!(response["result"], 2 * i);
                assert_eq!(response["id"], i);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
