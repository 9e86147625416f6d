//! End-to-end indexing of a small Symfony 2 project

use bumpalo::Bump;
use mago_database::file::FileId;
use symdex_core::{
    MemoryIndex, ProjectNature, ReferenceKind, ReferenceRecord, ServiceDefinition, ServiceLookup,
    SourceModule,
};
use symdex_indexer::metadata::{self, Metadata};
use symdex_indexer::{Indexer, IndexerConfig};

const PROJECT: &str = "/projects/acme";

struct Services;

impl ServiceLookup for Services {
    fn find_service(&self, id: &str, project_path: &str) -> Option<ServiceDefinition> {
        match (id, project_path) {
            ("doctrine.orm.default_entity_manager", PROJECT) => Some(ServiceDefinition {
                id: id.to_string(),
                class_name: "Doctrine\\ORM\\EntityManager".to_string(),
                public: true,
                tags: vec![],
            }),
            _ => None,
        }
    }
}

fn index_module(source: &str, module_path: &str, nature: &dyn ProjectNature) -> MemoryIndex {
    let arena = Bump::new();
    let file_id = FileId::new(module_path);
    let (program, error) = mago_syntax::parser::parse_file_content(&arena, file_id, source);
    assert!(error.is_none(), "fixture {} does not parse", module_path);

    let config = IndexerConfig::default();
    let indexer = Indexer::new(&config, nature, &Services);
    let module = SourceModule::new(module_path, PROJECT);

    let mut index = MemoryIndex::new();
    indexer.index_program(program, source, &module, &mut index);
    index
}

fn index(source: &str, module_path: &str) -> MemoryIndex {
    index_module(source, module_path, &true)
}

fn text_of<'s>(source: &'s str, record: &ReferenceRecord) -> &'s str {
    &source[record.offset as usize..record.end_offset() as usize]
}

const AUTOLOAD: &str = r#"<?php

use Symfony\Component\ClassLoader\UniversalClassLoader;

$loader = new UniversalClassLoader();
$loader->registerNamespaces(array(
    'Symfony'          => array(__DIR__.'/../vendor/symfony/src', __DIR__.'/../vendor/bundles'),
    'Sensio'           => __DIR__.'/../vendor/bundles',
    'Doctrine\\Common' => __DIR__.'/../vendor/doctrine-common/lib',
    'Acme'             => __DIR__.'/../src',
));
$loader->registerNamespaceFallbacks(array(
    __DIR__.'/../src',
));
$loader->register();
"#;

const BLOG_CONTROLLER: &str = r#"<?php

namespace Acme\BlogBundle\Controller;

use Acme\BlogBundle\Entity\Post;
use Acme\BlogBundle\Form\PostType;
use Symfony\Bundle\FrameworkBundle\Controller\Controller;
use Sensio\Bundle\FrameworkExtraBundle\Configuration\Route;
use Sensio\Bundle\FrameworkExtraBundle\Configuration\Template;

/**
 * @Route("/blog")
 */
class PostController extends Controller
{
    /**
     * @Route("/", name="blog_index")
     * @Template()
     */
    public function indexAction()
    {
        return array('title' => 'Latest posts');
    }

    /**
     * @Route("/{id}/edit")
     */
    public function editAction($id)
    {
        $post = new Post();
        $form = new PostType();

        if ($id) {
            return $this->render('AcmeBlogBundle:Post:edit.html.twig', array(
                'post' => $post,
                'form' => $form,
            ));
        }

        return $this->render('AcmeBlogBundle:Post:edit.html.twig', array(
            'post' => $post,
            'error' => 'Not found',
        ));
    }
}

class ArchiveController extends Controller
{
    public function listAction()
    {
        return $this->render('AcmeBlogBundle:Archive:list.html.twig', array(
            'posts' => $this->getPosts(),
        ));
    }
}
"#;

#[test]
fn test_project_without_marker_emits_nothing() {
    for (source, path) in [(AUTOLOAD, "app/autoload.php"), (BLOG_CONTROLLER, "src/Acme/BlogBundle/Controller/PostController.php")] {
        let index = index_module(source, path, &false);
        assert!(index.is_empty());
        assert_eq!(index.route_batches, 0);
        assert_eq!(index.service_batches, 0);
    }
}

#[test]
fn test_autoload_namespaces() {
    let index = index(AUTOLOAD, "app/autoload.php");
    let names: Vec<&str> = index
        .references_of(ReferenceKind::Namespace)
        .into_iter()
        .map(|r| r.name.as_str())
        .collect();

    assert_eq!(
        names,
        vec![
            "vendor/symfony/src",
            "vendor/bundles",
            "vendor/doctrine-common/lib",
            "src",
            "src",
        ]
    );
    assert!(index.references.iter().all(|r| r.offset == 0 && r.length == 0));
}

#[test]
fn test_bootstrap_never_produces_namespaces() {
    let index = index(AUTOLOAD, "app/bootstrap.php");
    assert!(index.references_of(ReferenceKind::Namespace).is_empty());
}

#[test]
fn test_front_controller_environment() {
    let source = r#"<?php

use Symfony\Component\HttpFoundation\Request;

require_once __DIR__.'/../app/bootstrap.php.cache';
require_once __DIR__.'/../app/AppKernel.php';

$kernel = new AppKernel('prod', true);
$kernel->loadClassCache();
$kernel->handle(Request::createFromGlobals())->send();
"#;
    let index = index(source, "web/app.php");
    let environments = index.references_of(ReferenceKind::Environment);
    assert_eq!(environments.len(), 1);
    assert_eq!(environments[0].name, "prod");
    assert_eq!(text_of(source, environments[0]), "new AppKernel('prod', true)");
    assert_eq!(environments[0].secondary_path.as_deref(), Some("web/app.php"));
}

#[test]
fn test_service_aliases() {
    let source = r#"<?php

namespace Acme\BlogBundle\DependencyInjection;

class AcmeBlogExtension
{
    public function load(array $configs, $container)
    {
        $container->setAlias('acme.entity_manager', 'doctrine.orm.default_entity_manager');
        $container->setAlias('acme.mailer', 'swiftmailer.mailer');
        $container->setAlias($configs['alias'], 'doctrine.orm.default_entity_manager');
    }
}
"#;
    let index = index(source, "src/Acme/BlogBundle/DependencyInjection/AcmeBlogExtension.php");
    assert_eq!(index.services.len(), 1);
    assert_eq!(index.service_batches, 1);
    assert_eq!(index.services[0].alias_id, "acme.entity_manager");
    assert_eq!(index.services[0].project_path, PROJECT);
    assert!(index.references.is_empty());
}

#[test]
fn test_controller_variables_and_routes() {
    let index = index(BLOG_CONTROLLER, "src/Acme/BlogBundle/Controller/PostController.php");

    let variables = index.references_of(ReferenceKind::TemplateVariable);
    let summary: Vec<(&str, Option<&str>)> = variables
        .iter()
        .map(|r| (r.name.as_str(), r.secondary_path.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("title", Some("AcmeBlogBundle:Post:index")),
            ("post", Some("AcmeBlogBundle:Post:edit")),
            ("form", Some("AcmeBlogBundle:Post:edit")),
            ("error", Some("AcmeBlogBundle:Post:edit")),
        ]
    );

    let form = metadata::parse(variables[2].metadata.as_deref().unwrap()).unwrap();
    assert_eq!(
        form,
        Metadata::Reference {
            class_name: "PostType".to_string(),
            namespace: "Acme\\BlogBundle\\Form".to_string(),
            view_path: "AcmeBlogBundle:Post:edit.html.twig".to_string(),
            method: "editAction".to_string(),
        }
    );
    assert!(text_of(BLOG_CONTROLLER, variables[1]).starts_with("'post' => $post"));

    let routes: Vec<(&str, &str)> = index
        .routes
        .iter()
        .map(|(route, _)| (route.name.as_str(), route.pattern.as_str()))
        .collect();
    assert_eq!(
        routes,
        vec![("blog_index", "/blog/"), ("acme_blog_post_edit", "/blog/{id}/edit")]
    );
    assert!(index.routes.iter().all(|(_, project)| project == PROJECT));

    // One batch per class; the archive controller contributes nothing
    assert_eq!(index.route_batches, 2);
}

#[test]
fn test_view_and_route_methods() {
    let source = r#"<?php

namespace Acme\BlogBundle\Templating;

class Helper
{
    /**
     * Renders a view.
     *
     * @param string $view       The view name
     * @param array  $parameters An array of parameters to pass to the view
     */
    public function render($view, array $parameters = array())
    {
        return $this->engine->render($view, $parameters);
    }

    /**
     * Generates a URL from the given parameters.
     *
     * @param string $route The name of the route
     * @param mixed  $parameters An array of parameters
     */
    public function generateUrl($route, $parameters = array())
    {
        return $this->router->generate($route, $parameters);
    }
}

class Other
{
    public function render($view)
    {
    }
}
"#;
    let index = index(source, "src/Acme/BlogBundle/Templating/Helper.php");

    let views = index.references_of(ReferenceKind::ViewMethod);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name, "render");
    assert!(text_of(source, views[0]).contains("function render("));

    let routes = index.references_of(ReferenceKind::RouteMethod);
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].name, "generateUrl");
    assert!(text_of(source, routes[0]).trim_end().ends_with('}'));
}

#[test]
fn test_next_class_starts_clean() {
    let index = index(BLOG_CONTROLLER, "src/Acme/BlogBundle/Controller/PostController.php");
    assert!(index
        .references_of(ReferenceKind::TemplateVariable)
        .iter()
        .all(|r| !r.secondary_path.as_deref().unwrap_or("").contains("Archive")));
}

#[test]
fn test_import_order_does_not_matter() {
    let template = |imports: &str| {
        format!(
            r#"<?php
namespace Acme\BlogBundle\Controller;

{}

class PostController
{{
    public function showAction()
    {{
        return $this->render('AcmeBlogBundle:Post:show.html.twig', array(
            'post' => new Post(),
            'comment' => new Comment(),
        ));
    }}
}}
"#,
            imports
        )
    };

    let first = template("use Acme\\BlogBundle\\Entity\\Post;\nuse Acme\\CommentBundle\\Entity\\Comment;");
    let second = template("use Acme\\CommentBundle\\Entity\\Comment;\nuse Acme\\BlogBundle\\Entity\\Post;");

    let path = "src/Acme/BlogBundle/Controller/PostController.php";
    let first_index = index(&first, path);
    let second_index = index(&second, path);

    let metadata_of = |index: &MemoryIndex| -> Vec<Option<String>> {
        index.references.iter().map(|r| r.metadata.clone()).collect()
    };
    assert_eq!(first_index.references.len(), 2);
    assert_eq!(metadata_of(&first_index), metadata_of(&second_index));
}

#[test]
fn test_last_import_wins_on_collision() {
    let source = r#"<?php
namespace Acme\BlogBundle\Controller;

use Acme\BlogBundle\Entity\Post;
use Acme\NewsBundle\Entity\Post;

class PostController
{
    public function showAction()
    {
        return $this->render('AcmeBlogBundle:Post:show.html.twig', array('post' => new Post()));
    }
}
"#;
    let index = index(source, "src/Acme/BlogBundle/Controller/PostController.php");
    let metadata = metadata::parse(index.references[0].metadata.as_deref().unwrap()).unwrap();
    assert!(matches!(
        metadata,
        Metadata::Reference { ref namespace, .. } if namespace == "Acme\\NewsBundle\\Entity"
    ));
}

#[test]
fn test_plain_comment_before_class_keeps_no_route_prefix() {
    let source = r#"<?php
namespace Acme\BlogBundle\Controller;

/**
 * @Route("/blog")
 */
class PostController
{
    /**
     * @Route("/{id}", name="blog_show")
     */
    public function showAction($id)
    {
    }
}

/* Archive pages */
class ArchiveController
{
    /**
     * @Route("/archive", name="archive")
     */
    public function indexAction()
    {
    }

    /* helper */
    public function helper()
    {
    }
}
"#;
    let index = index(source, "src/Acme/BlogBundle/Controller/PostController.php");
    let routes: Vec<(&str, &str, &str)> = index
        .routes
        .iter()
        .map(|(route, _)| (route.name.as_str(), route.pattern.as_str(), route.action.as_str()))
        .collect();
    assert_eq!(
        routes,
        vec![
            ("blog_show", "/blog/{id}", "showAction"),
            ("archive", "/archive", "indexAction"),
        ]
    );
}
