use anyhow::Result;
use std::path::Path;

use crate::llm::models::provider_base::Message;
use crate::workspace::exclusion::ExclusionRules;
use crate::workspace::ignore_cache::IgnoreCache;
use crate::workspace::scanner::scan;
use crate::workspace::tree_format::format_tree;

pub const SYSTEM_PROMPT: &str = "You are a file selection assistant for a code editor. \
You receive the file tree of a project and a request written in natural language. \
Select every file from the tree that matches the request. \
Respond with only a JSON object of the form {\"files\": [...]} or a JSON array, \
containing the absolute paths of the selected files. \
Only use paths that appear in the tree. \
Do not add explanations, comments or any other text.";

/// A fixed example exchange shown to the model before the real request.
pub struct FewShotExample {
    pub tree: &'static str,
    pub root: &'static str,
    pub request: &'static str,
    pub answer: &'static str,
}

const EXAMPLE_TREE_WEB: &str = "/home/user/webshop
├── package.json
├── src
│   ├── api
│   │   ├── client.ts
│   │   └── orders.ts
│   ├── auth
│   │   ├── login.tsx
│   │   ├── session.ts
│   │   └── session.test.ts
│   ├── components
│   │   ├── Button.tsx
│   │   ├── Button.module.css
│   │   └── Header.tsx
│   ├── styles
│   │   ├── theme.scss
│   │   └── global.css
│   └── index.tsx
└── tests
    └── orders.spec.ts";

const EXAMPLE_TREE_PY: &str = "/srv/billing
├── billing
│   ├── __init__.py
│   ├── invoices.py
│   ├── payments.py
│   └── utils.py
├── README.md
├── setup.py
└── tests
    ├── conftest.py
    ├── test_invoices.py
    └── test_payments.py";

pub const FEW_SHOT_EXAMPLES: [FewShotExample; 4] = [
    FewShotExample {
        tree: EXAMPLE_TREE_WEB,
        root: "/home/user/webshop",
        request: "all typescript files in the api folder",
        answer: r#"{"files": ["/home/user/webshop/src/api/client.ts", "/home/user/webshop/src/api/orders.ts"]}"#,
    },
    FewShotExample {
        tree: EXAMPLE_TREE_WEB,
        root: "/home/user/webshop",
        request: "everything related to authentication",
        answer: r#"{"files": ["/home/user/webshop/src/auth/login.tsx", "/home/user/webshop/src/auth/session.ts", "/home/user/webshop/src/auth/session.test.ts"]}"#,
    },
    FewShotExample {
        tree: EXAMPLE_TREE_WEB,
        root: "/home/user/webshop",
        request: "stylesheets",
        answer: r#"{"files": ["/home/user/webshop/src/components/Button.module.css", "/home/user/webshop/src/styles/theme.scss", "/home/user/webshop/src/styles/global.css"]}"#,
    },
    FewShotExample {
        tree: EXAMPLE_TREE_PY,
        root: "/srv/billing",
        request: "the tests",
        answer: r#"{"files": ["/srv/billing/tests/conftest.py", "/srv/billing/tests/test_invoices.py", "/srv/billing/tests/test_payments.py"]}"#,
    },
];

fn user_turn(tree: &str, root: &str, request: &str) -> String {
    format!(
        "Project file tree:\n{}\n\nProject root: {}\n\nRequest: {}",
        tree, root, request
    )
}

/// System instruction, the fixed examples, then the real request.
pub fn build_messages_for_tree(user_prompt: &str, root_label: &str, tree: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2 + FEW_SHOT_EXAMPLES.len() * 2);
    messages.push(Message::system(SYSTEM_PROMPT));
    for example in FEW_SHOT_EXAMPLES.iter() {
        messages.push(Message::user(user_turn(example.tree, example.root, example.request)));
        messages.push(Message::assistant(example.answer));
    }
    messages.push(Message::user(user_turn(tree, root_label, user_prompt)));
    messages
}

/// Scans `root` and builds the selection prompt around its file tree.
pub fn build_messages(
    user_prompt: &str,
    root: &Path,
    rules: &ExclusionRules,
    cache: &mut IgnoreCache,
) -> Result<Vec<Message>> {
    let entries = scan(root, rules, cache)?;
    let root_label = root.to_string_lossy();
    let tree = format_tree(&root_label, &entries, None, None);
    Ok(build_messages_for_tree(user_prompt, &root_label, &tree))
}
