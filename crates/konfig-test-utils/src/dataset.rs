//! Canned upstream package states.
//!
//! `DATASET_1` is the state packages are forked from; `DATASET_2` is the
//! same package after upstream advances: the deployment scales up and gains
//! an environment variable, and a config map appears.

/// A dataset is a list of (relative path, file content) pairs.
pub type Dataset = &'static [(&'static str, &'static str)];

pub const DATASET_1: Dataset = &[
    (
        "deployment.yaml",
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: frontend
  namespace: web
spec:
  replicas: 3
  template:
    spec:
      containers:
      - name: app
        image: nginx:1.25
        ports:
        - containerPort: 80
"#,
    ),
    (
        "service.yaml",
        r#"apiVersion: v1
kind: Service
metadata:
  name: frontend
  namespace: web
spec:
  selector:
    app: frontend
  ports:
  - port: 80
"#,
    ),
    ("README.md", "# frontend\n\nUpstream configuration package.\n"),
];

pub const DATASET_2: Dataset = &[
    (
        "deployment.yaml",
        r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: frontend
  namespace: web
spec:
  replicas: 5
  template:
    spec:
      containers:
      - name: app
        image: nginx:1.27
        ports:
        - containerPort: 80
        env:
        - name: LOG_LEVEL
          value: info
"#,
    ),
    (
        "service.yaml",
        r#"apiVersion: v1
kind: Service
metadata:
  name: frontend
  namespace: web
spec:
  selector:
    app: frontend
  ports:
  - port: 80
"#,
    ),
    (
        "configmap.yaml",
        r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: frontend-config
  namespace: web
data:
  mode: production
"#,
    ),
    ("README.md", "# frontend\n\nUpstream configuration package, v2.\n"),
];
